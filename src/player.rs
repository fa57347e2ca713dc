// Player projection dataset: types and JSON loading.
//
// The dataset is a single JSON array of player records carrying overall
// projected rate stats plus optional per-handedness splits. Field names
// follow the dataset's own headers (Name, Team, wRC+, ...), mapped via
// serde renames. Players are loaded once at startup and never mutated.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Projected stats for one batter against a single pitcher handedness.
///
/// `pa` is the plate-appearance sample behind the split and gates whether
/// the split is considered reliable enough to aggregate (see
/// `lineup::summary` and `Config::qualifying_pa`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitLine {
    #[serde(rename = "PA")]
    pub pa: f64,
    #[serde(rename = "AVG")]
    pub avg: f64,
    #[serde(rename = "OBP")]
    pub obp: f64,
    #[serde(rename = "SLG")]
    pub slg: f64,
    #[serde(rename = "wRC+")]
    pub wrc_plus: f64,
    #[serde(rename = "BB%", default, skip_serializing_if = "Option::is_none")]
    pub bb_pct: Option<f64>,
    #[serde(rename = "K%", default, skip_serializing_if = "Option::is_none")]
    pub k_pct: Option<f64>,
}

/// Per-handedness splits. Either side may be absent for players without
/// enough history against that handedness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Splits {
    #[serde(rename = "vsRHP", default, skip_serializing_if = "Option::is_none")]
    pub vs_rhp: Option<SplitLine>,
    #[serde(rename = "vsLHP", default, skip_serializing_if = "Option::is_none")]
    pub vs_lhp: Option<SplitLine>,
}

/// Which side a batter hits from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattingSide {
    L,
    R,
    S,
}

/// One player record from the projection dataset.
///
/// Names are assumed unique within the dataset. A missing team or the
/// literal `"FA"` marks a free agent. `war` and `def` are optional:
/// some projection sources omit them, and the finder treats absence as
/// a first-class value rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Team", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(rename = "Bats", default, skip_serializing_if = "Option::is_none")]
    pub bats: Option<BattingSide>,
    #[serde(rename = "AVG")]
    pub avg: f64,
    #[serde(rename = "OBP")]
    pub obp: f64,
    #[serde(rename = "SLG")]
    pub slg: f64,
    #[serde(rename = "wRC+")]
    pub wrc_plus: f64,
    #[serde(rename = "BB%")]
    pub bb_pct: f64,
    #[serde(rename = "K%")]
    pub k_pct: f64,
    #[serde(rename = "WAR", default, skip_serializing_if = "Option::is_none")]
    pub war: Option<f64>,
    #[serde(rename = "Def", default, skip_serializing_if = "Option::is_none")]
    pub def: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splits: Option<Splits>,
}

impl Player {
    /// Whether this player is a free agent (no team, or the `"FA"` marker).
    pub fn is_free_agent(&self) -> bool {
        match self.team.as_deref() {
            None | Some("") | Some("FA") => true,
            Some(_) => false,
        }
    }

    /// The split line for the given handedness, if present.
    pub fn split(&self, key: crate::finder::SplitKey) -> Option<&SplitLine> {
        use crate::finder::SplitKey;
        let splits = self.splits.as_ref()?;
        match key {
            SplitKey::Overall => None,
            SplitKey::VsRhp => splits.vs_rhp.as_ref(),
            SplitKey::VsLhp => splits.vs_lhp.as_ref(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Load the player dataset from a JSON file.
pub fn load_players(path: &Path) -> Result<Vec<Player>, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Distinct team codes in the dataset, sorted, with blanks and the free
/// agent marker excluded.
pub fn team_list(players: &[Player]) -> Vec<String> {
    let mut teams: Vec<String> = players
        .iter()
        .filter_map(|p| p.team.as_deref())
        .filter(|t| !t.is_empty() && *t != "FA")
        .map(str::to_string)
        .collect();
    teams.sort();
    teams.dedup();
    teams
}
