pub mod field;
pub mod game;
pub mod ids;
pub mod outcome;
pub mod play_event;

pub use field::{FieldPosition, Side};
pub use game::{
    AppliedPlay, GameInfo, GamePhase, GameResult, GameState, QuarterScore, Score, SkippedPlay,
    Transition,
};
pub use ids::{GameId, PlayId, Quarter, TeamId};
pub use outcome::{
    FieldGoalAttempt, FieldGoalRange, PlayOutcome, ScoreDelta, ScoreKind, TurnoverKind,
};
pub use play_event::{PlayEvent, PlayRecord, PlayType, ScoreSnapshot, SignificantPlay, TagSet};
