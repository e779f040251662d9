//! Recorded plays as delivered by the annotation pipeline.
//!
//! `PlayRecord` is the loosely typed wire shape (strings for the closed
//! vocabularies). `PlayEvent` is the validated, immutable form every other
//! component consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::field::FieldPosition;
use super::ids::{GameId, PlayId, Quarter, TeamId};
use crate::error::{ClassificationError, UnknownSignificantPlayTag};

/// Kind of snap or kick recorded on the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    Run,
    CompletedPass,
    IncompletePass,
    Kickoff,
    Punt,
    ExtraPoint,
    TwoPoint,
    FieldGoal,
    Sack,
    None,
}

impl PlayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayType::Run => "run",
            PlayType::CompletedPass => "completed_pass",
            PlayType::IncompletePass => "incomplete_pass",
            PlayType::Kickoff => "kickoff",
            PlayType::Punt => "punt",
            PlayType::ExtraPoint => "extra_point",
            PlayType::TwoPoint => "two_point",
            PlayType::FieldGoal => "field_goal",
            PlayType::Sack => "sack",
            PlayType::None => "none",
        }
    }

    /// Forward or backward pass thrown from scrimmage.
    pub fn is_pass(&self) -> bool {
        matches!(self, PlayType::CompletedPass | PlayType::IncompletePass)
    }

    /// Plays that hand the ball to the other team without a turnover.
    pub fn is_kick(&self) -> bool {
        matches!(self, PlayType::Kickoff | PlayType::Punt)
    }

    /// Scoring tries after a touchdown; they consume no down.
    pub fn is_try(&self) -> bool {
        matches!(self, PlayType::ExtraPoint | PlayType::TwoPoint)
    }

    /// Snaps that count against the down and distance.
    pub fn is_scrimmage(&self) -> bool {
        matches!(
            self,
            PlayType::Run
                | PlayType::CompletedPass
                | PlayType::IncompletePass
                | PlayType::Sack
                | PlayType::Punt
                | PlayType::FieldGoal
        )
    }

    /// Plays that end with a ball carrier being tackled behind or past the line.
    pub fn has_ball_carrier(&self) -> bool {
        matches!(self, PlayType::Run | PlayType::CompletedPass | PlayType::Sack)
    }
}

impl FromStr for PlayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(PlayType::Run),
            "completed_pass" => Ok(PlayType::CompletedPass),
            "incomplete_pass" => Ok(PlayType::IncompletePass),
            "kickoff" => Ok(PlayType::Kickoff),
            "punt" => Ok(PlayType::Punt),
            "extra_point" => Ok(PlayType::ExtraPoint),
            "two_point" => Ok(PlayType::TwoPoint),
            "field_goal" => Ok(PlayType::FieldGoal),
            "sack" => Ok(PlayType::Sack),
            "none" => Ok(PlayType::None),
            _ => Err(format!("unknown play type: {s:?}")),
        }
    }
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highlights an annotator attached to a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum SignificantPlay {
    Touchdown,
    TwoPointGood,
    TwoPointNoGood,
    PatGood,
    PatNoGood,
    FieldGoalGood,
    FieldGoalNoGood,
    Penalty,
    Sack,
    TackleForLoss,
    FumbleSituation,
    FumbleRecoveredByOffense,
    FumbleRecoveredByDefense,
    Interception,
    Turnover,
    Safety,
}

impl SignificantPlay {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignificantPlay::Touchdown => "touchdown",
            SignificantPlay::TwoPointGood => "two_point_good",
            SignificantPlay::TwoPointNoGood => "two_point_no_good",
            SignificantPlay::PatGood => "pat_good",
            SignificantPlay::PatNoGood => "pat_no_good",
            SignificantPlay::FieldGoalGood => "field_goal_good",
            SignificantPlay::FieldGoalNoGood => "field_goal_no_good",
            SignificantPlay::Penalty => "penalty",
            SignificantPlay::Sack => "sack",
            SignificantPlay::TackleForLoss => "tackle_for_loss",
            SignificantPlay::FumbleSituation => "fumble_situation",
            SignificantPlay::FumbleRecoveredByOffense => "fumble_recovered_by_offense",
            SignificantPlay::FumbleRecoveredByDefense => "fumble_recovered_by_defense",
            SignificantPlay::Interception => "interception",
            SignificantPlay::Turnover => "turnover",
            SignificantPlay::Safety => "safety",
        }
    }
}

impl FromStr for SignificantPlay {
    type Err = UnknownSignificantPlayTag;

    /// Exact, case-sensitive match against the tag vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "touchdown" => Ok(SignificantPlay::Touchdown),
            "two_point_good" => Ok(SignificantPlay::TwoPointGood),
            "two_point_no_good" => Ok(SignificantPlay::TwoPointNoGood),
            "pat_good" => Ok(SignificantPlay::PatGood),
            "pat_no_good" => Ok(SignificantPlay::PatNoGood),
            "field_goal_good" => Ok(SignificantPlay::FieldGoalGood),
            "field_goal_no_good" => Ok(SignificantPlay::FieldGoalNoGood),
            "penalty" => Ok(SignificantPlay::Penalty),
            "sack" => Ok(SignificantPlay::Sack),
            "tackle_for_loss" => Ok(SignificantPlay::TackleForLoss),
            "fumble_situation" => Ok(SignificantPlay::FumbleSituation),
            "fumble_recovered_by_offense" => Ok(SignificantPlay::FumbleRecoveredByOffense),
            "fumble_recovered_by_defense" => Ok(SignificantPlay::FumbleRecoveredByDefense),
            "interception" => Ok(SignificantPlay::Interception),
            "turnover" => Ok(SignificantPlay::Turnover),
            "safety" => Ok(SignificantPlay::Safety),
            _ => Err(UnknownSignificantPlayTag { tag: s.to_string() }),
        }
    }
}

impl fmt::Display for SignificantPlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free list of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SignificantPlay>", into = "Vec<SignificantPlay>")]
pub struct TagSet(Vec<SignificantPlay>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, keeping first-seen order. Returns false for a repeat.
    pub fn insert(&mut self, tag: SignificantPlay) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: SignificantPlay) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = SignificantPlay> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<SignificantPlay>> for TagSet {
    fn from(tags: Vec<SignificantPlay>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<SignificantPlay> {
    fn from(set: TagSet) -> Self {
        set.0
    }
}

impl FromIterator<SignificantPlay> for TagSet {
    fn from_iter<I: IntoIterator<Item = SignificantPlay>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Score at the snap, as burned into the broadcast graphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub offense: u16,
    pub defense: u16,
}

/// Wire record from the annotation pipeline. Vocabulary fields are plain
/// strings so that unknown values reach validation instead of failing the
/// whole feed at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub id: PlayId,
    pub game_id: GameId,
    pub quarter: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yards_to_go: Option<u8>,
    pub offense: TeamId,
    pub defense: TeamId,
    pub play_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<FieldPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<FieldPosition>,
    #[serde(default)]
    pub significant_plays: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_before: Option<ScoreSnapshot>,
    /// Net gain as charted by the annotator; wins over start/end geometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yards: Option<i16>,
    /// Signed penalty yardage, positive when the offense benefits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_yards: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_yards: Option<u16>,
}

/// Validated, immutable play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub id: PlayId,
    pub game_id: GameId,
    pub quarter: Quarter,
    pub down: Option<u8>,
    pub yards_to_go: Option<u8>,
    pub offense: TeamId,
    pub defense: TeamId,
    pub play_type: PlayType,
    pub start: Option<FieldPosition>,
    pub end: Option<FieldPosition>,
    pub tags: TagSet,
    pub score_before: Option<ScoreSnapshot>,
    pub yards: Option<i16>,
    pub penalty_yards: Option<i16>,
    pub return_yards: Option<u16>,
    /// Tags dropped at ingestion because they are not in the vocabulary.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized_tags: Vec<String>,
}

impl PlayEvent {
    /// Minimal event for a play type; the remaining fields start empty.
    pub fn new(
        id: impl Into<PlayId>,
        game_id: impl Into<GameId>,
        offense: impl Into<TeamId>,
        defense: impl Into<TeamId>,
        play_type: PlayType,
    ) -> Self {
        Self {
            id: id.into(),
            game_id: game_id.into(),
            quarter: Quarter::FIRST,
            down: None,
            yards_to_go: None,
            offense: offense.into(),
            defense: defense.into(),
            play_type,
            start: None,
            end: None,
            tags: TagSet::new(),
            score_before: None,
            yards: None,
            penalty_yards: None,
            return_yards: None,
            unrecognized_tags: Vec::new(),
        }
    }

    /// Validates a wire record. Unknown tags are ignored with a warning;
    /// anything else outside the vocabulary is malformed.
    pub fn from_record(record: PlayRecord) -> Result<Self, ClassificationError> {
        let play_type = record
            .play_type
            .parse::<PlayType>()
            .map_err(|e| ClassificationError::malformed(&record.id, e))?;

        if record.quarter == 0 {
            return Err(ClassificationError::malformed(&record.id, "quarter must start at 1"));
        }
        if let Some(down) = record.down {
            if !(1..=4).contains(&down) {
                return Err(ClassificationError::malformed(
                    &record.id,
                    format!("down {down} outside 1..=4"),
                ));
            }
        }
        if record.offense == record.defense {
            return Err(ClassificationError::malformed(
                &record.id,
                format!("offense and defense are both {}", record.offense),
            ));
        }

        let mut tags = TagSet::new();
        let mut unrecognized_tags = Vec::new();
        for raw in &record.significant_plays {
            match raw.parse::<SignificantPlay>() {
                Ok(tag) => {
                    tags.insert(tag);
                }
                Err(unknown) => {
                    warn!(play_id = %record.id, "{unknown}, ignoring");
                    unrecognized_tags.push(unknown.tag);
                }
            }
        }

        Ok(Self {
            id: record.id,
            game_id: record.game_id,
            quarter: Quarter(record.quarter),
            down: record.down,
            yards_to_go: record.yards_to_go,
            offense: record.offense,
            defense: record.defense,
            play_type,
            start: record.start,
            end: record.end,
            tags,
            score_before: record.score_before,
            yards: record.yards,
            penalty_yards: record.penalty_yards,
            return_yards: record.return_yards,
            unrecognized_tags,
        })
    }

    pub fn has(&self, tag: SignificantPlay) -> bool {
        self.tags.contains(tag)
    }

    /// Net yards gained by the offense: charted yards, else start→end geometry, else 0.
    pub fn net_yards(&self) -> i32 {
        if let Some(yards) = self.yards {
            return yards as i32;
        }
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => start.gain_to(end),
            _ => 0,
        }
    }

    // Builder-style setters used by adapters and tests.

    pub fn in_quarter(mut self, quarter: u8) -> Self {
        self.quarter = Quarter(quarter);
        self
    }

    pub fn at_down(mut self, down: u8, yards_to_go: u8) -> Self {
        self.down = Some(down);
        self.yards_to_go = Some(yards_to_go);
        self
    }

    pub fn from_spot(mut self, start: FieldPosition) -> Self {
        self.start = Some(start);
        self
    }

    pub fn to_spot(mut self, end: FieldPosition) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_tag(mut self, tag: SignificantPlay) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_yards(mut self, yards: i16) -> Self {
        self.yards = Some(yards);
        self
    }

    pub fn with_penalty(mut self, penalty_yards: i16) -> Self {
        self.tags.insert(SignificantPlay::Penalty);
        self.penalty_yards = Some(penalty_yards);
        self
    }

    pub fn with_return(mut self, return_yards: u16) -> Self {
        self.return_yards = Some(return_yards);
        self
    }
}
