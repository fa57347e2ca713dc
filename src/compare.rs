// Side-by-side scenario comparison. Read-only over saved snapshots; the
// live working roster is never involved.

use crate::lineup::RosterState;
use crate::scenario::{Scenario, ScenarioStore};

/// Every saved scenario across every team, team-major (teams in map
/// order, creation order within each team).
pub fn list_all_scenarios(scenarios: &ScenarioStore) -> Vec<&Scenario> {
    scenarios.values().flatten().collect()
}

/// Read-only roster views for the selected scenarios, one per scenario
/// in the given order. Zero scenarios yields an empty projection, not an
/// error.
pub fn project<'a>(selected: &[&'a Scenario]) -> Vec<&'a RosterState> {
    selected.iter().map(|s| &s.state).collect()
}
