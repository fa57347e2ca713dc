// Configuration loading and parsing (lineup.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::lineup::LeagueAverages;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Everything the engine reads from lineup.toml. Every section and key
/// is optional; missing pieces fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSection,
    pub store: StoreSection,
    pub league: LeagueSection,
    pub splits: SplitsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// JSON projection dataset with per-handedness splits.
    pub players_path: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        DataSection {
            players_path: PathBuf::from("data/projections_with_splits.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub db_path: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            db_path: "lineup-lab.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeagueSection {
    /// League-wide reference batting line used for summary deltas.
    pub averages: LeagueAverages,
    /// Team loaded when no selection has been stored yet.
    pub default_team: String,
}

impl Default for LeagueSection {
    fn default() -> Self {
        LeagueSection {
            averages: LeagueAverages::default(),
            default_team: "BOS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitsSection {
    /// Minimum split plate appearances before a player's split line
    /// counts as a reliable sample.
    ///
    /// Earlier releases used two thresholds: 98 gated the per-player
    /// split display while 100 gated the lineup split summary. That gap
    /// was an accident, not a design choice, so both call sites now
    /// read this single value.
    pub qualifying_pa: f64,
}

impl Default for SplitsSection {
    fn default() -> Self {
        SplitsSection {
            qualifying_pa: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load `lineup.toml` from the working directory when present, otherwise
/// fall back to the built-in defaults.
pub fn load_or_default() -> Result<Config, ConfigError> {
    let path = Path::new("lineup.toml");
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.splits.qualifying_pa < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "splits.qualifying_pa".to_string(),
            message: "must be non-negative".to_string(),
        });
    }
    if config.store.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "store.db_path".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.league.default_team.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.default_team".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.splits.qualifying_pa, 100.0);
        assert_eq!(config.league.default_team, "BOS");
        assert!((config.league.averages.wrc - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [splits]
            qualifying_pa = 75
            "#,
        )
        .unwrap();
        assert_eq!(config.splits.qualifying_pa, 75.0);
        assert_eq!(config.store.db_path, "lineup-lab.db");
    }

    #[test]
    fn league_averages_overridable() {
        let config: Config = toml::from_str(
            r#"
            [league]
            default_team = "SEA"
            averages = { avg = 0.243, obp = 0.312, slg = 0.399, ops = 0.711, wrc = 100.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.league.default_team, "SEA");
        assert!((config.league.averages.avg - 0.243).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_threshold_rejected() {
        let config: Config = toml::from_str(
            r#"
            [splits]
            qualifying_pa = -1
            "#,
        )
        .unwrap();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_typed_error() {
        let err = load_config(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
