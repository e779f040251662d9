//! Play classification and per-game state tracking.

pub mod classifier;
pub mod config;
pub mod tracker;

pub use classifier::{
    classify, field_goal_distance, field_goal_range, is_tackle_for_loss, punt_result, Classifier,
};
pub use config::RulesConfig;
pub use tracker::{
    possession_after, process_games_parallel, FeedEntry, GameFeed, GameTracker, PlayDisposition,
};
