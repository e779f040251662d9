use thiserror::Error;

use crate::models::{GameId, PlayId, Quarter, TeamId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldPositionError {
    #[error("yard line {yard} is outside 0..=50")]
    YardOutOfRange { yard: i32 },
}

/// A scheduled game that cannot be tracked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameInfoError {
    #[error("game {game_id} lists {team} as both home and away")]
    SameTeam { game_id: GameId, team: TeamId },
}

/// A play that cannot be turned into an outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("malformed play {play_id}: {reason}")]
    Malformed { play_id: PlayId, reason: String },
}

impl ClassificationError {
    pub fn malformed(play_id: &PlayId, reason: impl Into<String>) -> Self {
        ClassificationError::Malformed { play_id: play_id.clone(), reason: reason.into() }
    }

    pub fn play_id(&self) -> &PlayId {
        match self {
            ClassificationError::Malformed { play_id, .. } => play_id,
        }
    }
}

/// Tag outside the closed vocabulary. Ignored with a warning, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown significant play tag: {tag:?}")]
pub struct UnknownSignificantPlayTag {
    pub tag: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("game {game_id} is already final, rejected {entry}")]
    GameAlreadyFinalized { game_id: GameId, entry: String },
}

/// Why a play was dropped from a game's history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("play {play_id} belongs to game {found}, not {expected}")]
    WrongGame { play_id: PlayId, expected: GameId, found: GameId },

    #[error("team {team} on play {play_id} is not part of this game")]
    TeamNotInGame { play_id: PlayId, team: TeamId },

    #[error("play {play_id} is in {found} but the game is already in {current}")]
    QuarterRegression { play_id: PlayId, current: Quarter, found: Quarter },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("game {game_id} was already merged into {team}'s season")]
    DuplicateGame { team: TeamId, game_id: GameId },

    #[error("team {team} did not play in game {game_id}")]
    TeamNotInGame { team: TeamId, game_id: GameId },

    #[error("game {game_id} belongs to season {found}, accumulator is for season {expected}")]
    SeasonMismatch { game_id: GameId, expected: u16, found: u16 },

    #[error("cannot combine season stats of {left} with {right}")]
    TeamMismatch { left: TeamId, right: TeamId },

    #[error(transparent)]
    InvalidGame(#[from] GameInfoError),
}

impl AggregationError {
    /// Whether the rejected merge left the accumulator untouched and can simply be dropped.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AggregationError::DuplicateGame { .. } => true,
            AggregationError::TeamNotInGame { .. } => true,
            AggregationError::SeasonMismatch { .. } => false,
            AggregationError::TeamMismatch { .. } => false,
            AggregationError::InvalidGame(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid rules config: {0}")]
    Invalid(String),
}

/// Errors surfaced by the JSON adapters.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unsupported schema version: found {found}, expected {expected}")]
    SchemaVersion { found: u8, expected: u8 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CoreError::Deserialization(err.to_string())
        } else {
            CoreError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
