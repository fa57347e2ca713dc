// Scenario persistence: autosaves, named snapshots, and the legacy
// storage-shape migration.
//
// Three logical keys live in the storage port:
//   `selected-team` — plain team code string.
//   `autosave`      — JSON map of team -> working RosterState.
//   `scenarios`     — JSON map of team -> list of saved Scenario.
//
// An earlier release stored `scenarios` as a bare list with no team key.
// Decoding migrates that shape by parking the whole list under the
// `LEGACY` team, keeping the data instead of discarding it. Persisted
// data is an advisory cache: unparsable JSON is logged and treated as
// absent, never propagated as an error, and decoded roster states are
// repaired to the expected shape (`RosterState::normalize`) before use.
// Store I/O failures do propagate.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lineup::RosterState;
use crate::store::StoragePort;

pub const SELECTED_TEAM_KEY: &str = "selected-team";
pub const AUTOSAVE_KEY: &str = "autosave";
pub const SCENARIOS_KEY: &str = "scenarios";

/// Sentinel team that adopts scenarios migrated from the flat legacy
/// shape.
pub const LEGACY_TEAM: &str = "LEGACY";

/// A named, immutable snapshot of one team's full roster state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Creation time as UTC milliseconds since the epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub state: RosterState,
}

/// All saved scenarios, keyed by team. BTreeMap gives the deterministic
/// team-major iteration the compare page relies on; within a team the
/// list keeps creation order.
pub type ScenarioStore = BTreeMap<String, Vec<Scenario>>;

/// The two shapes the `scenarios` key has ever been stored in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedScenarios {
    ByTeam(ScenarioStore),
    Legacy(Vec<Scenario>),
}

fn decode_scenarios(raw: &str) -> ScenarioStore {
    let mut by_team = match serde_json::from_str::<PersistedScenarios>(raw) {
        Ok(PersistedScenarios::ByTeam(by_team)) => by_team,
        Ok(PersistedScenarios::Legacy(list)) => {
            let mut by_team = ScenarioStore::new();
            by_team.insert(LEGACY_TEAM.to_string(), list);
            by_team
        }
        Err(e) => {
            warn!("unreadable scenarios value, starting empty: {e}");
            ScenarioStore::new()
        }
    };
    for (team, list) in &mut by_team {
        for scenario in list {
            if scenario.state.normalize() {
                warn!(%team, id = %scenario.id, "repaired scenario with broken roster shape");
            }
        }
    }
    by_team
}

/// Read and normalize the scenario store. A legacy flat list comes back
/// under the `LEGACY` team; the caller is responsible for writing the
/// migrated shape back (see `upgrade_legacy`).
pub fn load_all(store: &dyn StoragePort) -> Result<ScenarioStore> {
    match store.get(SCENARIOS_KEY)? {
        Some(raw) => Ok(decode_scenarios(&raw)),
        None => Ok(ScenarioStore::new()),
    }
}

/// Load the scenario store and, if the persisted value still used the
/// legacy flat shape, write the migrated shape back so the migration
/// runs at most once.
pub fn upgrade_legacy(store: &dyn StoragePort) -> Result<ScenarioStore> {
    let Some(raw) = store.get(SCENARIOS_KEY)? else {
        return Ok(ScenarioStore::new());
    };
    let scenarios = decode_scenarios(&raw);
    let was_legacy = matches!(
        serde_json::from_str::<PersistedScenarios>(&raw),
        Ok(PersistedScenarios::Legacy(_))
    );
    if was_legacy {
        warn!(
            count = scenarios.get(LEGACY_TEAM).map_or(0, Vec::len),
            "migrated flat scenario list to team-keyed storage"
        );
        persist(store, &scenarios)?;
    }
    Ok(scenarios)
}

/// Write the whole scenario store back to the port.
pub fn persist(store: &dyn StoragePort, scenarios: &ScenarioStore) -> Result<()> {
    let raw = serde_json::to_string(scenarios).context("failed to serialize scenarios")?;
    store.set(SCENARIOS_KEY, &raw)
}

/// Snapshot `state` as a new named scenario under `team`, persist the
/// updated store, and return the created scenario. Ids are UUIDv4, so
/// they are unique across all teams.
pub fn save(
    store: &dyn StoragePort,
    team: &str,
    name: &str,
    state: &RosterState,
) -> Result<Scenario> {
    let scenario = Scenario {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_at: chrono::Utc::now().timestamp_millis(),
        state: state.clone(),
    };
    let mut scenarios = load_all(store)?;
    scenarios
        .entry(team.to_string())
        .or_default()
        .push(scenario.clone());
    persist(store, &scenarios)?;
    Ok(scenario)
}

/// Remove the scenario with `id` from `team`'s list. Deleting an id that
/// isn't there is a no-op; the store is persisted either way.
pub fn delete(store: &dyn StoragePort, team: &str, id: &str) -> Result<()> {
    let mut scenarios = load_all(store)?;
    if let Some(list) = scenarios.get_mut(team) {
        list.retain(|s| s.id != id);
    }
    persist(store, &scenarios)
}

fn decode_autosaves(raw: &str) -> BTreeMap<String, RosterState> {
    let mut map: BTreeMap<String, RosterState> = match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            warn!("unreadable autosave value, starting empty: {e}");
            BTreeMap::new()
        }
    };
    for (team, state) in &mut map {
        if state.normalize() {
            warn!(%team, "repaired autosave with broken roster shape");
        }
    }
    map
}

/// One team's autosaved working roster, if any.
pub fn load_autosave(store: &dyn StoragePort, team: &str) -> Result<Option<RosterState>> {
    let Some(raw) = store.get(AUTOSAVE_KEY)? else {
        return Ok(None);
    };
    Ok(decode_autosaves(&raw).remove(team))
}

/// Replace one team's autosave entry, leaving other teams' entries
/// untouched. Called after every roster mutation.
pub fn write_autosave(store: &dyn StoragePort, team: &str, state: &RosterState) -> Result<()> {
    let mut autosaves = match store.get(AUTOSAVE_KEY)? {
        Some(raw) => decode_autosaves(&raw),
        None => BTreeMap::new(),
    };
    autosaves.insert(team.to_string(), state.clone());
    let raw = serde_json::to_string(&autosaves).context("failed to serialize autosaves")?;
    store.set(AUTOSAVE_KEY, &raw)
}

/// Drop one team's autosave entry entirely (the "clear lineup" action).
pub fn clear_autosave(store: &dyn StoragePort, team: &str) -> Result<()> {
    let Some(raw) = store.get(AUTOSAVE_KEY)? else {
        return Ok(());
    };
    let mut autosaves = decode_autosaves(&raw);
    autosaves.remove(team);
    let raw = serde_json::to_string(&autosaves).context("failed to serialize autosaves")?;
    store.set(AUTOSAVE_KEY, &raw)
}

/// The last selected team, if one was stored.
pub fn load_selected_team(store: &dyn StoragePort) -> Result<Option<String>> {
    store.get(SELECTED_TEAM_KEY)
}

pub fn store_selected_team(store: &dyn StoragePort, team: &str) -> Result<()> {
    store.set(SELECTED_TEAM_KEY, team)
}
