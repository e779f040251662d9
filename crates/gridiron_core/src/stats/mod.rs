//! Season statistics: per-game contributions folded into per-team totals.

pub mod contribution;
pub mod counters;
pub mod ledger;
pub mod team_season;

pub use contribution::GameContribution;
pub use counters::{SeasonRates, StatCounters};
pub use ledger::{aggregate_season, SeasonLedger, SeasonReport};
pub use team_season::{merge, TeamSeasonSnapshot, TeamSeasonStats};
