// Lineup domain: roster state and aggregate summaries.

pub mod roster;
pub mod summary;

pub use roster::{
    LineupSlot, LineupVariant, PositionSwap, RosterState, RosterVariant, SwapAction, BENCH_SIZE,
    LINEUP_SIZE,
};
pub use summary::{delta, summarize, summarize_split, LeagueAverages, LineupSummary};
