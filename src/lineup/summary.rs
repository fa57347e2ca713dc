// Lineup-level aggregate stats and league-average deltas.

use serde::{Deserialize, Serialize};

use crate::finder::SplitKey;
use crate::player::Player;

/// Team-level batting line: unweighted means over the given players.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineupSummary {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub wrc: f64,
}

/// League-wide reference line used for delta coloring. Values are
/// config-overridable; the defaults approximate recent MLB seasons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueAverages {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub wrc: f64,
}

impl Default for LeagueAverages {
    fn default() -> Self {
        LeagueAverages {
            avg: 0.248,
            obp: 0.315,
            slg: 0.395,
            ops: 0.710,
            wrc: 100.0,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Aggregate a set of players' overall stats into one batting line.
///
/// Each field is the unweighted mean; OPS is the mean OBP plus the mean
/// SLG. An empty input yields an all-zero summary (callers skip
/// rendering it rather than treating it as an error).
pub fn summarize(players: &[&Player]) -> LineupSummary {
    if players.is_empty() {
        return LineupSummary::default();
    }
    let obp = mean(players.iter().map(|p| p.obp));
    let slg = mean(players.iter().map(|p| p.slg));
    LineupSummary {
        avg: mean(players.iter().map(|p| p.avg)),
        obp,
        slg,
        ops: obp + slg,
        wrc: mean(players.iter().map(|p| p.wrc_plus)),
    }
}

/// Aggregate one handedness split, restricted to players whose split
/// sample reaches `min_pa` plate appearances. Players without a split
/// record for `split_key`, or below the threshold, are excluded from
/// every mean. Passing `SplitKey::Overall` degenerates to an empty
/// summary since split records only exist per handedness.
pub fn summarize_split(players: &[&Player], split_key: SplitKey, min_pa: f64) -> LineupSummary {
    let lines: Vec<_> = players
        .iter()
        .filter_map(|p| p.split(split_key))
        .filter(|line| line.pa >= min_pa)
        .collect();
    if lines.is_empty() {
        return LineupSummary::default();
    }
    let obp = mean(lines.iter().map(|l| l.obp));
    let slg = mean(lines.iter().map(|l| l.slg));
    LineupSummary {
        avg: mean(lines.iter().map(|l| l.avg)),
        obp,
        slg,
        ops: obp + slg,
        wrc: mean(lines.iter().map(|l| l.wrc_plus)),
    }
}

/// Signed difference against a league-average value. The sign drives
/// good/bad coloring in the rendering layer; this engine only computes
/// the number.
pub fn delta(summary_value: f64, league_value: f64) -> f64 {
    summary_value - league_value
}
