//! # gridiron_core - Football Play Classification and Season Statistics
//!
//! Turns raw play-by-play feeds into classified outcomes, tracks each game's
//! down, distance, possession and score, and folds finalized games into
//! per-team season statistics.
//!
//! ## Features
//! - Closed play-type and significant-play vocabularies with strict parsing
//! - Deterministic per-game state machine; malformed plays are skipped, not fatal
//! - Idempotent season aggregation (a game counts once per team)
//! - Games and seasons processed in parallel with rayon
//! - JSON API for easy integration

// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// Method naming conventions - would require API changes
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::should_implement_trait)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod stats;

// Re-export main API functions
pub use api::{aggregate_season_json, classify_play_json, process_game_json};
pub use error::{
    AggregationError, ClassificationError, ConfigError, CoreError, GameInfoError, Result,
    SkipReason, TrackerError,
};

// Re-export engine
pub use engine::{
    classify, process_games_parallel, Classifier, FeedEntry, GameFeed, GameTracker,
    PlayDisposition, RulesConfig,
};

// Re-export domain types
pub use models::{
    FieldPosition, GameId, GameInfo, GameResult, PlayEvent, PlayOutcome, PlayRecord, PlayType,
    Quarter, Score, Side, SignificantPlay, TeamId,
};

// Re-export season statistics
pub use stats::{
    aggregate_season, merge, SeasonLedger, SeasonRates, SeasonReport, StatCounters,
    TeamSeasonSnapshot, TeamSeasonStats,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
