use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::FieldPosition;
use super::ids::{PlayId, Quarter, TeamId};
use super::play_event::PlayType;

/// Why points were awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Touchdown,
    TwoPointConversion,
    ExtraPoint,
    FieldGoal,
    Safety,
}

impl ScoreKind {
    pub fn points(&self) -> u16 {
        match self {
            ScoreKind::Touchdown => 6,
            ScoreKind::TwoPointConversion => 2,
            ScoreKind::ExtraPoint => 1,
            ScoreKind::FieldGoal => 3,
            ScoreKind::Safety => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub team: TeamId,
    pub kind: ScoreKind,
    pub points: u16,
}

impl ScoreDelta {
    pub fn new(team: TeamId, kind: ScoreKind) -> Self {
        Self { team, kind, points: kind.points() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    Interception,
    Fumble,
    /// Generic turnover tag without a specific cause
    Unknown,
}

/// Distance band for field-goal attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum FieldGoalRange {
    #[serde(rename = "1-19")]
    Under20,
    #[serde(rename = "20-29")]
    Twenties,
    #[serde(rename = "30-39")]
    Thirties,
    #[serde(rename = "40-49")]
    Forties,
    #[serde(rename = "50+")]
    FiftyPlus,
}

impl FieldGoalRange {
    /// Closed bands [1,19] [20,29] [30,39] [40,49] [50,inf). Zero has no band.
    pub fn from_distance(distance: u16) -> Option<Self> {
        match distance {
            0 => None,
            1..=19 => Some(FieldGoalRange::Under20),
            20..=29 => Some(FieldGoalRange::Twenties),
            30..=39 => Some(FieldGoalRange::Thirties),
            40..=49 => Some(FieldGoalRange::Forties),
            _ => Some(FieldGoalRange::FiftyPlus),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldGoalRange::Under20 => "1-19",
            FieldGoalRange::Twenties => "20-29",
            FieldGoalRange::Thirties => "30-39",
            FieldGoalRange::Forties => "40-49",
            FieldGoalRange::FiftyPlus => "50+",
        }
    }
}

impl fmt::Display for FieldGoalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGoalAttempt {
    /// Kick distance in yards; absent when the clip carries no spot.
    pub distance: Option<u16>,
    pub range: Option<FieldGoalRange>,
    pub good: bool,
}

/// Classified result of one play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub play_id: PlayId,
    pub quarter: Quarter,
    pub offense: TeamId,
    pub defense: TeamId,
    pub play_type: PlayType,
    /// Down and distance as reported by the feed, not as tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yards_to_go: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<FieldPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<FieldPosition>,
    /// Points in the order they were scored on the clip.
    pub scores: Vec<ScoreDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover: Option<TurnoverKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_possession: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_goal: Option<FieldGoalAttempt>,
    pub tackle_for_loss: bool,
    pub sack: bool,
    pub punt_inside_20: bool,
    pub punt_touchback: bool,
    pub net_yards: i32,
    /// Signed penalty yardage (positive favours the offense). Present when
    /// the play carries a penalty tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<i16>,
    pub return_yards: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returning_team: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized_tags: Vec<String>,
}

impl PlayOutcome {
    pub fn is_turnover(&self) -> bool {
        self.turnover.is_some()
    }

    pub fn is_scoring(&self) -> bool {
        !self.scores.is_empty()
    }

    /// Total points this play awarded to `team`.
    pub fn points_for(&self, team: &TeamId) -> u16 {
        self.scores.iter().filter(|s| &s.team == team).map(|s| s.points).sum()
    }

    /// Team credited with the first score on the play, if any.
    pub fn scoring_team(&self) -> Option<&TeamId> {
        self.scores.first().map(|s| &s.team)
    }

    /// Team credited with the last score, which kicks off next.
    pub fn last_scoring_team(&self) -> Option<&TeamId> {
        self.scores.last().map(|s| &s.team)
    }

    pub fn has_score(&self, kind: ScoreKind) -> bool {
        self.scores.iter().any(|s| s.kind == kind)
    }
}
