// Engine facade consumed by the rendering layer.
//
// `LineupApp` owns the dataset, the storage port, the working roster for
// the selected team, and the finder query. The rendering layer only ever
// calls the operations here and re-reads the accessors afterwards; it
// never computes filtering or aggregation itself and never touches the
// store directly. Every roster mutation commits a fresh autosave for the
// selected team before returning.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::finder::{self, FinderQuery, SortOption, StatFilter};
use crate::lineup::{
    summarize, summarize_split, LeagueAverages, LineupSummary, LineupVariant, PositionSwap,
    RosterState, SwapAction,
};
use crate::player::{BattingSide, Player};
use crate::scenario::{self, Scenario, ScenarioStore};
use crate::store::StoragePort;

pub struct LineupApp<S: StoragePort> {
    config: Config,
    players: Vec<Player>,
    store: S,
    selected_team: String,
    roster: RosterState,
    selected_player: Option<Player>,
    swap_rhp: PositionSwap,
    swap_lhp: PositionSwap,
    query: FinderQuery,
}

impl<S: StoragePort> LineupApp<S> {
    /// Build the engine: restore the selected team (falling back to the
    /// configured default), run the scenario-shape migration once, and
    /// load the team's autosaved roster if one exists.
    pub fn new(config: Config, players: Vec<Player>, store: S) -> Result<Self> {
        let selected_team = scenario::load_selected_team(&store)?
            .unwrap_or_else(|| config.league.default_team.clone());
        scenario::upgrade_legacy(&store)?;
        let roster = scenario::load_autosave(&store, &selected_team)?.unwrap_or_default();
        info!(team = %selected_team, players = players.len(), "lineup engine ready");
        Ok(LineupApp {
            config,
            players,
            store,
            selected_team,
            roster,
            selected_player: None,
            swap_rhp: PositionSwap::default(),
            swap_lhp: PositionSwap::default(),
            query: FinderQuery::default(),
        })
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn selected_team(&self) -> &str {
        &self.selected_team
    }

    pub fn roster(&self) -> &RosterState {
        &self.roster
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Players on the currently selected team, in dataset order.
    pub fn team_players(&self) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.team.as_deref() == Some(self.selected_team.as_str()))
            .collect()
    }

    /// Distinct team codes in the dataset.
    pub fn teams(&self) -> Vec<String> {
        crate::player::team_list(&self.players)
    }

    /// The finder's current result list: filtered and sorted.
    pub fn finder_results(&self) -> Vec<&Player> {
        finder::filter_players(&self.players, &self.query)
    }

    pub fn query(&self) -> &FinderQuery {
        &self.query
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.selected_player.as_ref()
    }

    pub fn pending_swap(&self, variant: LineupVariant) -> Option<u8> {
        match variant {
            LineupVariant::VsRhp => self.swap_rhp.pending(),
            LineupVariant::VsLhp => self.swap_lhp.pending(),
        }
    }

    pub fn league_averages(&self) -> &LeagueAverages {
        &self.config.league.averages
    }

    // ------------------------------------------------------------------
    // Finder query mutations (never persisted)
    // ------------------------------------------------------------------

    pub fn set_search(&mut self, search: &str) {
        self.query.search = search.to_string();
    }

    pub fn set_scope(&mut self, scope: finder::PlayerScope) {
        self.query.scope = scope;
    }

    pub fn set_bats(&mut self, bats: Option<BattingSide>) {
        self.query.bats = bats;
    }

    pub fn set_team_filter(&mut self, team: Option<String>) {
        self.query.team_filter = team;
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.query.sort = sort;
    }

    pub fn add_stat_filter(&mut self, filter: StatFilter) {
        self.query.stat_filters.push(filter);
    }

    /// Remove one filter chip by position. Out-of-range indices are
    /// ignored.
    pub fn remove_stat_filter(&mut self, index: usize) {
        if index < self.query.stat_filters.len() {
            self.query.stat_filters.remove(index);
        }
    }

    /// Reset search, handedness, and stat filters. Scope, team filter,
    /// and sort survive a reset.
    pub fn reset_filters(&mut self) {
        self.query.search.clear();
        self.query.bats = None;
        self.query.stat_filters.clear();
    }

    // ------------------------------------------------------------------
    // Player selection + roster mutations
    // ------------------------------------------------------------------

    /// Mark a player as the pending assignment target. Returns false if
    /// the name isn't in the dataset.
    pub fn select_player(&mut self, name: &str) -> bool {
        match self.players.iter().find(|p| p.name == name) {
            Some(p) => {
                self.selected_player = Some(p.clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_selected_player(&mut self) {
        self.selected_player = None;
    }

    fn commit(&mut self, next: RosterState) -> Result<()> {
        self.roster = next;
        scenario::write_autosave(&self.store, &self.selected_team, &self.roster)
    }

    /// Assign the pending player to a batting-order slot. Without a
    /// pending selection this is a no-op; on success the selection is
    /// consumed.
    pub fn assign(&mut self, variant: LineupVariant, order: u8) -> Result<()> {
        let Some(player) = self.selected_player.take() else {
            return Ok(());
        };
        debug!(team = %self.selected_team, ?variant, order, player = %player.name, "assign");
        let next = self
            .roster
            .with_variant(variant, |v| v.assign(order, player.clone()));
        self.commit(next)
    }

    pub fn unassign(&mut self, variant: LineupVariant, order: u8) -> Result<()> {
        let next = self.roster.with_variant(variant, |v| v.unassign(order));
        self.commit(next)
    }

    pub fn change_position(
        &mut self,
        variant: LineupVariant,
        order: u8,
        position: &str,
    ) -> Result<()> {
        let next = self
            .roster
            .with_variant(variant, |v| v.change_position(order, position));
        self.commit(next)
    }

    /// Feed one slot selection into the variant's position-swap state
    /// machine, applying the swap when it completes.
    pub fn select_position(&mut self, variant: LineupVariant, order: u8) -> Result<SwapAction> {
        let swap = match variant {
            LineupVariant::VsRhp => &mut self.swap_rhp,
            LineupVariant::VsLhp => &mut self.swap_lhp,
        };
        let action = swap.select(order);
        if let SwapAction::Swap(a, b) = action {
            let next = self
                .roster
                .with_variant(variant, |v| v.swap_positions(a, b));
            self.commit(next)?;
        }
        Ok(action)
    }

    /// Assign the pending player to a bench spot. Same selection
    /// semantics as `assign`.
    pub fn assign_bench(&mut self, variant: LineupVariant, index: usize) -> Result<()> {
        let Some(player) = self.selected_player.take() else {
            return Ok(());
        };
        let next = self
            .roster
            .with_variant(variant, |v| v.assign_bench(index, player.clone()));
        self.commit(next)
    }

    pub fn unassign_bench(&mut self, variant: LineupVariant, index: usize) -> Result<()> {
        let next = self
            .roster
            .with_variant(variant, |v| v.unassign_bench(index));
        self.commit(next)
    }

    /// Drop the selected team's autosave and reset the working roster to
    /// the default empty lineups.
    pub fn clear_lineup(&mut self) -> Result<()> {
        scenario::clear_autosave(&self.store, &self.selected_team)?;
        self.roster = RosterState::default();
        self.swap_rhp.reset();
        self.swap_lhp.reset();
        Ok(())
    }

    /// Switch teams: persist the selection, drop any pending swap, and
    /// load the new team's autosave (or a fresh empty roster). The
    /// previous team's working state stays in the autosave store.
    pub fn select_team(&mut self, team: &str) -> Result<()> {
        scenario::store_selected_team(&self.store, team)?;
        self.selected_team = team.to_string();
        self.roster = scenario::load_autosave(&self.store, team)?.unwrap_or_default();
        self.selected_player = None;
        self.swap_rhp.reset();
        self.swap_lhp.reset();
        info!(%team, "switched team");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------

    /// Snapshot the working roster under a name for the selected team.
    pub fn save_scenario(&self, name: &str) -> Result<Scenario> {
        scenario::save(&self.store, &self.selected_team, name, &self.roster)
    }

    pub fn delete_scenario(&self, id: &str) -> Result<()> {
        scenario::delete(&self.store, &self.selected_team, id)
    }

    /// Saved scenarios for the selected team, in creation order.
    pub fn saved_scenarios(&self) -> Result<Vec<Scenario>> {
        let mut all = scenario::load_all(&self.store)?;
        Ok(all.remove(&self.selected_team).unwrap_or_default())
    }

    /// The whole scenario store, for the compare page.
    pub fn all_scenarios(&self) -> Result<ScenarioStore> {
        scenario::load_all(&self.store)
    }

    /// Replace the working roster with a saved scenario's state. Returns
    /// false when the id isn't among the selected team's scenarios. The
    /// loaded state becomes the new autosave.
    pub fn load_scenario(&mut self, id: &str) -> Result<bool> {
        let scenarios = self.saved_scenarios()?;
        let Some(found) = scenarios.into_iter().find(|s| s.id == id) else {
            return Ok(false);
        };
        self.commit(found.state)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Summaries
    // ------------------------------------------------------------------

    /// Overall batting line for one variant's assigned starters.
    pub fn lineup_summary(&self, variant: LineupVariant) -> LineupSummary {
        summarize(&self.roster.variant(variant).starters())
    }

    /// Split batting line for one variant's starters, restricted to
    /// qualified split samples.
    pub fn split_summary(&self, variant: LineupVariant) -> LineupSummary {
        summarize_split(
            &self.roster.variant(variant).starters(),
            variant.split_key(),
            self.config.splits.qualifying_pa,
        )
    }

    /// Whether a player's split against this variant's handedness has a
    /// large enough sample to show.
    pub fn split_qualified(&self, player: &Player, variant: LineupVariant) -> bool {
        player
            .split(variant.split_key())
            .map_or(false, |line| line.pa >= self.config.splits.qualifying_pa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::{FilterOp, PlayerScope, SplitKey, StatKey};
    use crate::player::{SplitLine, Splits};
    use crate::store::MemoryStore;

    fn player(name: &str, team: Option<&str>, war: f64) -> Player {
        Player {
            name: name.to_string(),
            team: team.map(str::to_string),
            bats: None,
            avg: 0.270,
            obp: 0.340,
            slg: 0.450,
            wrc_plus: 110.0,
            bb_pct: 9.0,
            k_pct: 20.0,
            war: Some(war),
            def: None,
            splits: Some(Splits {
                vs_rhp: Some(SplitLine {
                    pa: 300.0,
                    avg: 0.280,
                    obp: 0.350,
                    slg: 0.470,
                    wrc_plus: 118.0,
                    bb_pct: None,
                    k_pct: None,
                }),
                vs_lhp: None,
            }),
        }
    }

    fn dataset() -> Vec<Player> {
        vec![
            player("Starter One", Some("BOS"), 5.0),
            player("Starter Two", Some("BOS"), 4.0),
            player("Rival", Some("NYY"), 3.0),
            player("Free Agent", None, 2.0),
        ]
    }

    fn app() -> LineupApp<MemoryStore> {
        LineupApp::new(Config::default(), dataset(), MemoryStore::new()).unwrap()
    }

    #[test]
    fn starts_on_default_team_with_empty_roster() {
        let app = app();
        assert_eq!(app.selected_team(), "BOS");
        assert!(app.roster().vs_rhp.lineup_players.is_empty());
        assert_eq!(app.team_players().len(), 2);
    }

    #[test]
    fn assign_requires_a_selected_player() {
        let mut app = app();
        app.assign(LineupVariant::VsRhp, 1).unwrap();
        assert!(app.roster().vs_rhp.player_at(1).is_none());

        assert!(app.select_player("Starter One"));
        app.assign(LineupVariant::VsRhp, 1).unwrap();
        assert_eq!(
            app.roster().vs_rhp.player_at(1).unwrap().name,
            "Starter One"
        );
        // Selection is consumed by the assignment.
        assert!(app.selected_player().is_none());
    }

    #[test]
    fn select_player_unknown_name_fails() {
        let mut app = app();
        assert!(!app.select_player("Nobody"));
    }

    #[test]
    fn mutations_autosave_and_survive_team_switch() {
        let mut app = app();
        app.select_player("Starter One");
        app.assign(LineupVariant::VsRhp, 3).unwrap();

        app.select_team("NYY").unwrap();
        assert!(app.roster().vs_rhp.player_at(3).is_none());

        app.select_team("BOS").unwrap();
        assert_eq!(
            app.roster().vs_rhp.player_at(3).unwrap().name,
            "Starter One"
        );
    }

    #[test]
    fn selected_team_persists_across_engine_restart() {
        let store = MemoryStore::new();
        {
            let mut app = LineupApp::new(Config::default(), dataset(), &store).unwrap();
            app.select_team("NYY").unwrap();
        }
        let app2 = LineupApp::new(Config::default(), dataset(), &store).unwrap();
        assert_eq!(app2.selected_team(), "NYY");
    }

    #[test]
    fn position_swap_via_facade() {
        let mut app = app();
        assert_eq!(
            app.select_position(LineupVariant::VsLhp, 1).unwrap(),
            SwapAction::Selected
        );
        assert_eq!(app.pending_swap(LineupVariant::VsLhp), Some(1));
        assert_eq!(
            app.select_position(LineupVariant::VsLhp, 8).unwrap(),
            SwapAction::Swap(1, 8)
        );
        let pos: Vec<&str> = app
            .roster()
            .vs_lhp
            .lineup_slots
            .iter()
            .map(|s| s.position.as_str())
            .collect();
        assert_eq!(pos[0], "C");
        assert_eq!(pos[7], "1B");
        // The other variant is untouched.
        assert_eq!(app.roster().vs_rhp.lineup_slots[0].position, "1B");
    }

    #[test]
    fn clear_lineup_resets_only_selected_team() {
        let mut app = app();
        app.select_player("Starter One");
        app.assign(LineupVariant::VsRhp, 1).unwrap();
        app.select_team("NYY").unwrap();
        app.select_player("Rival");
        app.assign(LineupVariant::VsRhp, 1).unwrap();

        app.clear_lineup().unwrap();
        assert!(app.roster().vs_rhp.player_at(1).is_none());

        app.select_team("BOS").unwrap();
        assert!(app.roster().vs_rhp.player_at(1).is_some());
    }

    #[test]
    fn scenario_save_load_delete_flow() {
        let mut app = app();
        app.select_player("Starter One");
        app.assign(LineupVariant::VsRhp, 1).unwrap();

        let saved = app.save_scenario("Opening Day").unwrap();
        let listed = app.saved_scenarios().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Opening Day");

        // Mutate further, then restore the snapshot.
        app.unassign(LineupVariant::VsRhp, 1).unwrap();
        assert!(app.roster().vs_rhp.player_at(1).is_none());
        assert!(app.load_scenario(&saved.id).unwrap());
        assert!(app.roster().vs_rhp.player_at(1).is_some());

        assert!(!app.load_scenario("missing-id").unwrap());

        app.delete_scenario(&saved.id).unwrap();
        assert!(app.saved_scenarios().unwrap().is_empty());
    }

    #[test]
    fn finder_results_respect_query_mutations() {
        let mut app = app();
        app.set_scope(PlayerScope::AllPlayers);
        assert_eq!(app.finder_results().len(), 4);

        app.add_stat_filter(StatFilter {
            stat: StatKey::War,
            split: SplitKey::Overall,
            operator: FilterOp::Ge,
            value: 4.0,
        });
        assert_eq!(app.finder_results().len(), 2);

        app.reset_filters();
        assert_eq!(app.finder_results().len(), 4);
        // Scope survives a filter reset.
        assert!(matches!(app.query().scope, PlayerScope::AllPlayers));
    }

    #[test]
    fn remove_stat_filter_out_of_range_is_ignored() {
        let mut app = app();
        app.add_stat_filter(StatFilter {
            stat: StatKey::WrcPlus,
            split: SplitKey::Overall,
            operator: FilterOp::Gt,
            value: 100.0,
        });
        app.remove_stat_filter(5);
        assert_eq!(app.query().stat_filters.len(), 1);
        app.remove_stat_filter(0);
        assert!(app.query().stat_filters.is_empty());
    }

    #[test]
    fn summaries_track_assigned_starters() {
        let mut app = app();
        assert_eq!(app.lineup_summary(LineupVariant::VsRhp), LineupSummary::default());

        app.select_player("Starter One");
        app.assign(LineupVariant::VsRhp, 1).unwrap();
        app.select_player("Starter Two");
        app.assign(LineupVariant::VsRhp, 2).unwrap();

        let summary = app.lineup_summary(LineupVariant::VsRhp);
        assert!((summary.avg - 0.270).abs() < 1e-9);
        assert!((summary.ops - 0.790).abs() < 1e-9);

        // Both fixtures carry a 300 PA vsRHP split, which qualifies.
        let split = app.split_summary(LineupVariant::VsRhp);
        assert!((split.wrc - 118.0).abs() < 1e-9);
        // Neither has a vsLHP split at all.
        assert_eq!(
            app.split_summary(LineupVariant::VsLhp),
            LineupSummary::default()
        );
    }

    #[test]
    fn split_qualification_uses_configured_threshold() {
        let mut config = Config::default();
        config.splits.qualifying_pa = 400.0;
        let app = LineupApp::new(config, dataset(), MemoryStore::new()).unwrap();
        let p = &app.players()[0];
        assert!(!app.split_qualified(p, LineupVariant::VsRhp));
        assert!(!app.split_qualified(p, LineupVariant::VsLhp));
    }
}
