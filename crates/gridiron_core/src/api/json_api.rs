use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{Classifier, FeedEntry, GameTracker, RulesConfig};
use crate::error::{CoreError, Result};
use crate::models::{GameInfo, GameResult, PlayEvent, PlayOutcome, PlayRecord};
use crate::stats::{aggregate_season, SeasonReport};
use crate::SCHEMA_VERSION;

#[derive(Debug, Deserialize)]
pub struct GameRequest {
    pub schema_version: u8,
    pub game: GameInfo,
    pub feed: Vec<FeedEntry>,
    /// Falls back to [`RulesConfig::from_env_or_default`] when absent.
    #[serde(default)]
    pub rules: Option<RulesConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub schema_version: u8,
    #[serde(flatten)]
    pub result: GameResult,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub schema_version: u8,
    pub play: PlayRecord,
    #[serde(default)]
    pub rules: Option<RulesConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayResponse {
    pub schema_version: u8,
    pub outcome: PlayOutcome,
}

#[derive(Debug, Deserialize)]
pub struct SeasonRequest {
    pub schema_version: u8,
    pub season: u16,
    pub games: Vec<GameResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeasonResponse {
    pub schema_version: u8,
    #[serde(flatten)]
    pub report: SeasonReport,
}

fn check_schema(found: u8) -> Result<()> {
    if found != SCHEMA_VERSION {
        return Err(CoreError::SchemaVersion { found, expected: SCHEMA_VERSION });
    }
    Ok(())
}

fn resolve_rules(rules: Option<RulesConfig>) -> Result<RulesConfig> {
    let rules = rules.unwrap_or_else(RulesConfig::from_env_or_default);
    rules.validate()?;
    Ok(rules)
}

/// Runs one game feed and returns the finalized game as JSON.
pub fn process_game_json(request_json: &str) -> Result<String> {
    let request: GameRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let rules = resolve_rules(request.rules)?;

    debug!(
        game_id = %request.game.game_id,
        entries = request.feed.len(),
        "processing game request"
    );
    let result = GameTracker::run_feed(request.game, request.feed, rules);
    let response = GameResponse { schema_version: SCHEMA_VERSION, result };
    Ok(serde_json::to_string(&response)?)
}

/// Classifies a single play in isolation.
pub fn classify_play_json(request_json: &str) -> Result<String> {
    let request: PlayRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let rules = resolve_rules(request.rules)?;

    let event = PlayEvent::from_record(request.play)?;
    let outcome = Classifier::new(rules).classify(&event)?;
    let response = PlayResponse { schema_version: SCHEMA_VERSION, outcome };
    Ok(serde_json::to_string(&response)?)
}

/// Aggregates finalized games into a season report.
pub fn aggregate_season_json(request_json: &str) -> Result<String> {
    let request: SeasonRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;

    let report = aggregate_season(request.season, &request.games);
    let response = SeasonResponse { schema_version: SCHEMA_VERSION, report };
    Ok(serde_json::to_string(&response)?)
}
