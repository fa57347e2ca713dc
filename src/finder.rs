// Player finder: filtering, stat resolution, and sort comparators.
//
// Everything here is a pure function over the immutable dataset. Missing
// values are represented as `None` and never raised as errors: a filter
// on an absent stat fails the filter, and an absent sort key sorts last.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::{BattingSide, Player};

/// The stats a filter or sort can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKey {
    #[serde(rename = "AVG")]
    Avg,
    #[serde(rename = "OBP")]
    Obp,
    #[serde(rename = "SLG")]
    Slg,
    #[serde(rename = "wRC+")]
    WrcPlus,
    #[serde(rename = "BB%")]
    BbPct,
    #[serde(rename = "K%")]
    KPct,
    #[serde(rename = "Def")]
    Def,
    #[serde(rename = "WAR")]
    War,
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatKey::Avg => "AVG",
            StatKey::Obp => "OBP",
            StatKey::Slg => "SLG",
            StatKey::WrcPlus => "wRC+",
            StatKey::BbPct => "BB%",
            StatKey::KPct => "K%",
            StatKey::Def => "Def",
            StatKey::War => "WAR",
        };
        f.write_str(label)
    }
}

/// Which slice of a player's stats a filter or sort reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitKey {
    #[serde(rename = "overall")]
    Overall,
    #[serde(rename = "vsRHP")]
    VsRhp,
    #[serde(rename = "vsLHP")]
    VsLhp,
}

/// Comparison operator for a stat filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
        };
        f.write_str(s)
    }
}

/// A single stat threshold. Filters compose with logical AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatFilter {
    pub stat: StatKey,
    pub split: SplitKey,
    pub operator: FilterOp,
    pub value: f64,
}

impl fmt::Display for StatFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let split = match self.split {
            SplitKey::Overall => "overall",
            SplitKey::VsRhp => "vsRHP",
            SplitKey::VsLhp => "vsLHP",
        };
        write!(f, "{} {} {} ({split})", self.stat, self.operator, self.value)
    }
}

/// The candidate pool a search operates over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerScope {
    FreeAgents,
    AllPlayers,
    Team(String),
}

/// Sort direction for a stat-based sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// How the result list is ordered. `War` (descending, missing treated
/// as zero) is the default.
#[derive(Debug, Clone, PartialEq)]
pub enum SortOption {
    War,
    Stat {
        stat: StatKey,
        split: SplitKey,
        direction: SortDirection,
    },
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::War
    }
}

/// All finder inputs in one place. The defaults match a freshly opened
/// finder: no search, all handedness, free agents, no stat filters,
/// WAR sort.
#[derive(Debug, Clone)]
pub struct FinderQuery {
    pub search: String,
    pub bats: Option<BattingSide>,
    pub scope: PlayerScope,
    /// Independent team narrowing on top of `scope`. `None` means no
    /// extra restriction.
    pub team_filter: Option<String>,
    pub stat_filters: Vec<StatFilter>,
    pub sort: SortOption,
}

impl Default for FinderQuery {
    fn default() -> Self {
        FinderQuery {
            search: String::new(),
            bats: None,
            scope: PlayerScope::FreeAgents,
            team_filter: None,
            stat_filters: Vec::new(),
            sort: SortOption::default(),
        }
    }
}

/// Resolve one stat for a player, either overall or from a handedness
/// split. Absence (no split record, or a field the split doesn't carry)
/// is a normal result, not an error.
pub fn resolve_stat(player: &Player, stat: StatKey, split: SplitKey) -> Option<f64> {
    if split == SplitKey::Overall {
        return match stat {
            StatKey::Avg => Some(player.avg),
            StatKey::Obp => Some(player.obp),
            StatKey::Slg => Some(player.slg),
            StatKey::WrcPlus => Some(player.wrc_plus),
            StatKey::BbPct => Some(player.bb_pct),
            StatKey::KPct => Some(player.k_pct),
            StatKey::Def => player.def,
            StatKey::War => player.war,
        };
    }
    let line = player.split(split)?;
    match stat {
        StatKey::Avg => Some(line.avg),
        StatKey::Obp => Some(line.obp),
        StatKey::Slg => Some(line.slg),
        StatKey::WrcPlus => Some(line.wrc_plus),
        StatKey::BbPct => line.bb_pct,
        StatKey::KPct => line.k_pct,
        // Splits never carry Def or WAR.
        StatKey::Def | StatKey::War => None,
    }
}

/// Whether a player satisfies one stat filter. An unresolvable value
/// fails the filter: absence is not a pass.
pub fn passes_filter(player: &Player, filter: &StatFilter) -> bool {
    let Some(value) = resolve_stat(player, filter.stat, filter.split) else {
        return false;
    };
    match filter.operator {
        FilterOp::Gt => value > filter.value,
        FilterOp::Ge => value >= filter.value,
        FilterOp::Lt => value < filter.value,
        FilterOp::Le => value <= filter.value,
    }
}

fn in_scope(player: &Player, scope: &PlayerScope) -> bool {
    match scope {
        PlayerScope::AllPlayers => true,
        PlayerScope::FreeAgents => player.is_free_agent(),
        PlayerScope::Team(team) => player.team.as_deref() == Some(team.as_str()),
    }
}

/// Filter the dataset down to the query's candidate list and sort it.
///
/// Predicates are independent, so ordering only matters for cost: the
/// cheap equality checks run before the stat-filter conjunction. The
/// sort is stable, so ties keep dataset order.
pub fn filter_players<'a>(players: &'a [Player], query: &FinderQuery) -> Vec<&'a Player> {
    let search = query.search.to_lowercase();
    let mut matched: Vec<&Player> = players
        .iter()
        .filter(|p| search.is_empty() || p.name.to_lowercase().contains(&search))
        .filter(|p| query.bats.map_or(true, |side| p.bats == Some(side)))
        .filter(|p| in_scope(p, &query.scope))
        .filter(|p| {
            query
                .team_filter
                .as_deref()
                .map_or(true, |team| p.team.as_deref() == Some(team))
        })
        .filter(|p| query.stat_filters.iter().all(|f| passes_filter(p, f)))
        .collect();
    matched.sort_by(|a, b| compare_players(a, b, &query.sort));
    matched
}

/// Comparator backing the finder's result ordering.
///
/// Default sort is WAR descending with a missing WAR treated as zero. A
/// stat sort puts players missing the value after those that have it;
/// two missing values compare equal, so a stable sort keeps their
/// relative order.
pub fn compare_players(a: &Player, b: &Player, sort: &SortOption) -> Ordering {
    match sort {
        SortOption::War => {
            let a_war = a.war.unwrap_or(0.0);
            let b_war = b.war.unwrap_or(0.0);
            b_war.total_cmp(&a_war)
        }
        SortOption::Stat {
            stat,
            split,
            direction,
        } => {
            let a_val = resolve_stat(a, *stat, *split);
            let b_val = resolve_stat(b, *stat, *split);
            match (a_val, b_val) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(av), Some(bv)) => match direction {
                    SortDirection::Desc => bv.total_cmp(&av),
                    SortDirection::Asc => av.total_cmp(&bv),
                },
            }
        }
    }
}

/// Quick lookup used by the free-agent search box: case-insensitive name
/// match over free agents only, best `limit` by WAR.
pub fn top_free_agents<'a>(players: &'a [Player], search: &str, limit: usize) -> Vec<&'a Player> {
    let query = FinderQuery {
        search: search.to_string(),
        scope: PlayerScope::FreeAgents,
        ..FinderQuery::default()
    };
    let mut matched = filter_players(players, &query);
    matched.truncate(limit);
    matched
}
