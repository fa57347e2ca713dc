// Roster state: batting-order slots, assignments, bench, and the
// two-step position swap.
//
// All mutation operations are value-returning: they leave `self` intact
// and hand back the updated roster, so autosaved and snapshotted states
// never alias the live one. Out-of-range orders and bench indices are
// caller bugs; they log a warning and return the state unchanged rather
// than corrupting it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::finder::SplitKey;
use crate::player::Player;

/// Batting-order slots per lineup variant.
pub const LINEUP_SIZE: usize = 9;

/// Bench entries per lineup variant.
pub const BENCH_SIZE: usize = 4;

/// One batting-order slot. `position` is a free-form label on purpose:
/// nothing validates it against a position enum, which keeps odd labels
/// ("UTIL", "OF") usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub order: u8,
    pub position: String,
}

/// Which of the two handedness-facing lineups an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineupVariant {
    #[serde(rename = "vsRHP")]
    VsRhp,
    #[serde(rename = "vsLHP")]
    VsLhp,
}

impl LineupVariant {
    /// The handedness split this lineup is built against.
    pub fn split_key(self) -> SplitKey {
        match self {
            LineupVariant::VsRhp => SplitKey::VsRhp,
            LineupVariant::VsLhp => SplitKey::VsLhp,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineupVariant::VsRhp => "vs RHP",
            LineupVariant::VsLhp => "vs LHP",
        }
    }
}

/// One handedness-facing lineup: nine ordered slots, a sparse map of
/// assignments, and exactly four bench entries.
///
/// Invariants: `slots` always holds orders 1..=9 (unassigned slots keep
/// their entry in `slots`, they just have no key in `players`), and
/// `bench` always has length 4. Nothing prevents the same player from
/// occupying several slots at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterVariant {
    pub lineup_slots: Vec<LineupSlot>,
    pub lineup_players: BTreeMap<u8, Player>,
    pub bench_players: Vec<Option<Player>>,
}

impl Default for RosterVariant {
    fn default() -> Self {
        RosterVariant {
            lineup_slots: default_batting_order(),
            lineup_players: BTreeMap::new(),
            bench_players: vec![None; BENCH_SIZE],
        }
    }
}

/// The default slot layout for a fresh lineup.
fn default_batting_order() -> Vec<LineupSlot> {
    ["1B", "2B", "3B", "SS", "LF", "CF", "RF", "C", "DH"]
        .iter()
        .enumerate()
        .map(|(i, pos)| LineupSlot {
            order: (i + 1) as u8,
            position: (*pos).to_string(),
        })
        .collect()
}

fn valid_order(order: u8) -> bool {
    (1..=LINEUP_SIZE as u8).contains(&order)
}

impl RosterVariant {
    /// Assign a player to a batting-order slot. Overwrite semantics: an
    /// already-filled slot is replaced and the previous occupant is
    /// simply dropped (they remain in the dataset pool).
    pub fn assign(&self, order: u8, player: Player) -> RosterVariant {
        if !valid_order(order) {
            warn!(order, "assign: slot order out of range, ignoring");
            return self.clone();
        }
        let mut next = self.clone();
        next.lineup_players.insert(order, player);
        next
    }

    /// Clear a slot's assignment. The slot itself stays in the batting
    /// order; only its player entry is removed.
    pub fn unassign(&self, order: u8) -> RosterVariant {
        if !valid_order(order) {
            warn!(order, "unassign: slot order out of range, ignoring");
            return self.clone();
        }
        let mut next = self.clone();
        next.lineup_players.remove(&order);
        next
    }

    /// Relabel a slot's position. Order and assignment are untouched.
    pub fn change_position(&self, order: u8, position: &str) -> RosterVariant {
        if !valid_order(order) {
            warn!(order, "change_position: slot order out of range, ignoring");
            return self.clone();
        }
        let mut next = self.clone();
        if let Some(slot) = next.lineup_slots.iter_mut().find(|s| s.order == order) {
            slot.position = position.to_string();
        }
        next
    }

    /// Swap the position labels (not the assignments) of two slots.
    pub fn swap_positions(&self, a: u8, b: u8) -> RosterVariant {
        if !valid_order(a) || !valid_order(b) {
            warn!(a, b, "swap_positions: slot order out of range, ignoring");
            return self.clone();
        }
        let mut next = self.clone();
        let pos_a = next.lineup_slots.iter().find(|s| s.order == a).map(|s| s.position.clone());
        let pos_b = next.lineup_slots.iter().find(|s| s.order == b).map(|s| s.position.clone());
        if let (Some(pos_a), Some(pos_b)) = (pos_a, pos_b) {
            for slot in &mut next.lineup_slots {
                if slot.order == a {
                    slot.position = pos_b.clone();
                } else if slot.order == b {
                    slot.position = pos_a.clone();
                }
            }
        }
        next
    }

    /// Place a player on the bench. Same overwrite semantics as `assign`.
    pub fn assign_bench(&self, index: usize, player: Player) -> RosterVariant {
        if index >= BENCH_SIZE {
            warn!(index, "assign_bench: index out of range, ignoring");
            return self.clone();
        }
        let mut next = self.clone();
        next.bench_players[index] = Some(player);
        next
    }

    /// Clear a bench entry.
    pub fn unassign_bench(&self, index: usize) -> RosterVariant {
        if index >= BENCH_SIZE {
            warn!(index, "unassign_bench: index out of range, ignoring");
            return self.clone();
        }
        let mut next = self.clone();
        next.bench_players[index] = None;
        next
    }

    /// Repair a deserialized variant so the shape invariants hold:
    /// slots covering orders 1..=9 in order, a bench of exactly four
    /// entries, and no assignments outside the batting order. Serde
    /// accepts any well-formed JSON, so persisted values are repaired at
    /// the decode boundary instead of trusted. Returns whether anything
    /// had to change.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.bench_players.len() != BENCH_SIZE {
            self.bench_players.resize(BENCH_SIZE, None);
            changed = true;
        }

        let slots_ok = self.lineup_slots.len() == LINEUP_SIZE
            && self
                .lineup_slots
                .iter()
                .enumerate()
                .all(|(i, s)| s.order == (i + 1) as u8);
        if !slots_ok {
            // Rebuild the batting order, keeping any position label that
            // survived for its order.
            let mut slots = default_batting_order();
            for slot in &mut slots {
                if let Some(existing) = self.lineup_slots.iter().find(|s| s.order == slot.order) {
                    slot.position = existing.position.clone();
                }
            }
            self.lineup_slots = slots;
            changed = true;
        }

        let assigned = self.lineup_players.len();
        self.lineup_players.retain(|order, _| valid_order(*order));
        if self.lineup_players.len() != assigned {
            changed = true;
        }

        changed
    }

    /// The player assigned to a slot, if any.
    pub fn player_at(&self, order: u8) -> Option<&Player> {
        self.lineup_players.get(&order)
    }

    /// Assigned starters in batting order.
    pub fn starters(&self) -> Vec<&Player> {
        self.lineup_slots
            .iter()
            .filter_map(|s| self.lineup_players.get(&s.order))
            .collect()
    }
}

/// The pair of handedness-facing lineups for one team. This is the unit
/// of autosave and of scenario snapshotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterState {
    #[serde(rename = "vsRHP")]
    pub vs_rhp: RosterVariant,
    #[serde(rename = "vsLHP")]
    pub vs_lhp: RosterVariant,
}

impl RosterState {
    pub fn variant(&self, key: LineupVariant) -> &RosterVariant {
        match key {
            LineupVariant::VsRhp => &self.vs_rhp,
            LineupVariant::VsLhp => &self.vs_lhp,
        }
    }

    /// Repair both variants of a deserialized state (see
    /// `RosterVariant::normalize`).
    pub fn normalize(&mut self) -> bool {
        let rhp = self.vs_rhp.normalize();
        let lhp = self.vs_lhp.normalize();
        rhp || lhp
    }

    /// Rebuild the state with one variant replaced by `f`'s result. The
    /// copy-on-write building block behind every roster mutation.
    pub fn with_variant(
        &self,
        key: LineupVariant,
        f: impl FnOnce(&RosterVariant) -> RosterVariant,
    ) -> RosterState {
        let mut next = self.clone();
        match key {
            LineupVariant::VsRhp => next.vs_rhp = f(&self.vs_rhp),
            LineupVariant::VsLhp => next.vs_lhp = f(&self.vs_lhp),
        }
        next
    }
}

/// Outcome of feeding one slot selection into the position swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAction {
    /// First selection recorded; waiting for a second slot.
    Selected,
    /// Same slot selected twice: pending selection dropped.
    Cancelled,
    /// Two distinct slots selected: swap their position labels.
    Swap(u8, u8),
}

/// Two-step position-label swap: selecting one slot arms the swap,
/// selecting a second completes it, reselecting the same slot cancels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionSwap {
    pending: Option<u8>,
}

impl PositionSwap {
    /// The armed slot order, if one is selected.
    pub fn pending(&self) -> Option<u8> {
        self.pending
    }

    /// Feed a slot selection through the state machine.
    pub fn select(&mut self, order: u8) -> SwapAction {
        match self.pending {
            None => {
                self.pending = Some(order);
                SwapAction::Selected
            }
            Some(first) if first == order => {
                self.pending = None;
                SwapAction::Cancelled
            }
            Some(first) => {
                self.pending = None;
                SwapAction::Swap(first, order)
            }
        }
    }

    /// Drop any pending selection (used when the lineup itself changes
    /// out from under the selection, e.g. on team switch).
    pub fn reset(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            team: Some("BOS".to_string()),
            bats: None,
            avg: 0.270,
            obp: 0.340,
            slg: 0.450,
            wrc_plus: 110.0,
            bb_pct: 9.5,
            k_pct: 19.0,
            war: Some(3.0),
            def: None,
            splits: None,
        }
    }

    fn assert_invariants(v: &RosterVariant) {
        let orders: Vec<u8> = v.lineup_slots.iter().map(|s| s.order).collect();
        assert_eq!(orders, (1..=9).collect::<Vec<u8>>());
        assert_eq!(v.bench_players.len(), BENCH_SIZE);
    }

    #[test]
    fn default_variant_has_nine_slots_and_four_bench() {
        let v = RosterVariant::default();
        assert_invariants(&v);
        assert!(v.lineup_players.is_empty());
        assert_eq!(v.lineup_slots[0].position, "1B");
        assert_eq!(v.lineup_slots[8].position, "DH");
    }

    #[test]
    fn assign_overwrites_without_returning_occupant() {
        let v = RosterVariant::default();
        let v = v.assign(3, player("First"));
        let v = v.assign(3, player("Second"));
        assert_eq!(v.player_at(3).unwrap().name, "Second");
        assert_eq!(v.lineup_players.len(), 1);
        assert_invariants(&v);
    }

    #[test]
    fn unassign_clears_only_that_slot() {
        let v = RosterVariant::default()
            .assign(2, player("Two"))
            .assign(5, player("Five"))
            .assign_bench(1, player("Bench"));
        let v = v.unassign(2);
        assert!(v.player_at(2).is_none());
        assert_eq!(v.player_at(5).unwrap().name, "Five");
        assert_eq!(v.bench_players[1].as_ref().unwrap().name, "Bench");
        assert_invariants(&v);
    }

    #[test]
    fn mutations_do_not_touch_the_original() {
        let original = RosterVariant::default().assign(1, player("Keeper"));
        let mutated = original.unassign(1);
        assert!(original.player_at(1).is_some());
        assert!(mutated.player_at(1).is_none());
    }

    #[test]
    fn change_position_keeps_order_and_assignment() {
        let v = RosterVariant::default().assign(4, player("SS Guy"));
        let v = v.change_position(4, "UTIL");
        let slot = v.lineup_slots.iter().find(|s| s.order == 4).unwrap();
        assert_eq!(slot.position, "UTIL");
        assert_eq!(v.player_at(4).unwrap().name, "SS Guy");
        assert_invariants(&v);
    }

    #[test]
    fn swap_positions_moves_labels_not_players() {
        let v = RosterVariant::default()
            .assign(1, player("Leadoff"))
            .assign(8, player("Catcher"));
        let swapped = v.swap_positions(1, 8);
        let pos = |v: &RosterVariant, o: u8| {
            v.lineup_slots
                .iter()
                .find(|s| s.order == o)
                .unwrap()
                .position
                .clone()
        };
        assert_eq!(pos(&swapped, 1), "C");
        assert_eq!(pos(&swapped, 8), "1B");
        // Assignments stay with the order, not the label.
        assert_eq!(swapped.player_at(1).unwrap().name, "Leadoff");
        assert_eq!(swapped.player_at(8).unwrap().name, "Catcher");
    }

    #[test]
    fn swap_is_its_own_inverse() {
        let v = RosterVariant::default();
        let round_trip = v.swap_positions(2, 7).swap_positions(2, 7);
        assert_eq!(round_trip, v);
    }

    #[test]
    fn out_of_range_operations_are_noops() {
        let v = RosterVariant::default().assign(1, player("A"));
        assert_eq!(v.assign(0, player("X")), v);
        assert_eq!(v.assign(10, player("X")), v);
        assert_eq!(v.unassign(12), v);
        assert_eq!(v.change_position(0, "C"), v);
        assert_eq!(v.swap_positions(1, 11), v);
        assert_eq!(v.assign_bench(4, player("X")), v);
        assert_eq!(v.unassign_bench(9), v);
    }

    #[test]
    fn bench_assign_and_unassign() {
        let v = RosterVariant::default().assign_bench(0, player("PH"));
        assert_eq!(v.bench_players[0].as_ref().unwrap().name, "PH");
        let v = v.assign_bench(0, player("Other"));
        assert_eq!(v.bench_players[0].as_ref().unwrap().name, "Other");
        let v = v.unassign_bench(0);
        assert!(v.bench_players[0].is_none());
        assert_invariants(&v);
    }

    #[test]
    fn same_player_may_fill_multiple_slots() {
        let v = RosterVariant::default()
            .assign(1, player("Ohtani"))
            .assign(9, player("Ohtani"))
            .assign_bench(0, player("Ohtani"));
        assert_eq!(v.lineup_players.len(), 2);
        assert!(v.bench_players[0].is_some());
    }

    #[test]
    fn starters_follow_batting_order() {
        let v = RosterVariant::default()
            .assign(7, player("Seventh"))
            .assign(2, player("Second"));
        let names: Vec<&str> = v.starters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "Seventh"]);
    }

    #[test]
    fn with_variant_replaces_only_one_side() {
        let state = RosterState::default();
        let next = state.with_variant(LineupVariant::VsLhp, |v| v.assign(1, player("L-only")));
        assert!(next.vs_lhp.player_at(1).is_some());
        assert!(next.vs_rhp.player_at(1).is_none());
        assert!(state.vs_lhp.player_at(1).is_none());
    }

    #[test]
    fn position_swap_state_machine() {
        let mut swap = PositionSwap::default();
        assert_eq!(swap.select(3), SwapAction::Selected);
        assert_eq!(swap.pending(), Some(3));
        assert_eq!(swap.select(3), SwapAction::Cancelled);
        assert_eq!(swap.pending(), None);

        assert_eq!(swap.select(3), SwapAction::Selected);
        assert_eq!(swap.select(6), SwapAction::Swap(3, 6));
        assert_eq!(swap.pending(), None);
    }

    #[test]
    fn normalize_repairs_short_bench_and_missing_slots() {
        let mut broken: RosterVariant = serde_json::from_str(
            r#"{ "lineupSlots": [], "lineupPlayers": {}, "benchPlayers": [] }"#,
        )
        .unwrap();
        assert!(broken.normalize());
        assert_invariants(&broken);
        assert_eq!(broken.lineup_slots[0].position, "1B");

        // Normalized state supports the full mutation surface again.
        let v = broken.assign_bench(0, player("PH"));
        assert_eq!(v.bench_players[0].as_ref().unwrap().name, "PH");
    }

    #[test]
    fn normalize_keeps_surviving_labels_and_drops_stray_assignments() {
        let mut broken: RosterVariant = serde_json::from_str(
            r#"{
                "lineupSlots": [{ "order": 3, "position": "UTIL" }],
                "lineupPlayers": { "3": {
                    "Name": "Keeper", "AVG": 0.3, "OBP": 0.4, "SLG": 0.5,
                    "wRC+": 140, "BB%": 10.0, "K%": 15.0
                }, "12": {
                    "Name": "Stray", "AVG": 0.2, "OBP": 0.3, "SLG": 0.3,
                    "wRC+": 70, "BB%": 5.0, "K%": 30.0
                } },
                "benchPlayers": [null, null, null, null, null, null]
            }"#,
        )
        .unwrap();
        assert!(broken.normalize());
        assert_invariants(&broken);
        let slot = broken.lineup_slots.iter().find(|s| s.order == 3).unwrap();
        assert_eq!(slot.position, "UTIL");
        assert_eq!(broken.player_at(3).unwrap().name, "Keeper");
        assert!(!broken.lineup_players.contains_key(&12));
    }

    #[test]
    fn normalize_is_a_noop_on_valid_state() {
        let mut v = RosterVariant::default()
            .assign(1, player("Leadoff"))
            .assign_bench(2, player("PH"));
        let before = v.clone();
        assert!(!v.normalize());
        assert_eq!(v, before);

        let mut state = RosterState::default();
        assert!(!state.normalize());
    }

    #[test]
    fn roster_state_serde_round_trip() {
        let state = RosterState::default().with_variant(LineupVariant::VsRhp, |v| {
            v.assign(1, player("Leadoff")).assign_bench(2, player("PH"))
        });
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"vsRHP\""));
        assert!(json.contains("\"lineupPlayers\""));
        assert!(json.contains("\"benchPlayers\""));
        let back: RosterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
