//! Game-level records produced by the tracker.

use serde::{Deserialize, Serialize};

use crate::error::GameInfoError;

use super::field::FieldPosition;
use super::ids::{GameId, PlayId, Quarter, TeamId};
use super::outcome::PlayOutcome;

#[derive(Debug, Clone, Deserialize)]
struct RawGameInfo {
    game_id: GameId,
    season: u16,
    home: TeamId,
    away: TeamId,
}

/// Identity of one game as scheduled. Loading rejects a team playing itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameInfo")]
pub struct GameInfo {
    pub game_id: GameId,
    pub season: u16,
    pub home: TeamId,
    pub away: TeamId,
}

impl TryFrom<RawGameInfo> for GameInfo {
    type Error = GameInfoError;

    fn try_from(raw: RawGameInfo) -> Result<Self, Self::Error> {
        let RawGameInfo { game_id, season, home, away } = raw;
        let info = GameInfo { game_id, season, home, away };
        info.validate()?;
        Ok(info)
    }
}

impl GameInfo {
    pub fn new(
        game_id: impl Into<GameId>,
        season: u16,
        home: impl Into<TeamId>,
        away: impl Into<TeamId>,
    ) -> Self {
        Self { game_id: game_id.into(), season, home: home.into(), away: away.into() }
    }

    pub fn validate(&self) -> Result<(), GameInfoError> {
        if self.home == self.away {
            return Err(GameInfoError::SameTeam {
                game_id: self.game_id.clone(),
                team: self.home.clone(),
            });
        }
        Ok(())
    }

    pub fn involves(&self, team: &TeamId) -> bool {
        &self.home == team || &self.away == team
    }

    pub fn opponent_of(&self, team: &TeamId) -> Option<&TeamId> {
        if &self.home == team {
            Some(&self.away)
        } else if &self.away == team {
            Some(&self.home)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    PreKickoff,
    InProgress,
    Final,
}

/// Down-and-distance bookkeeping event recorded alongside a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Next down, same series
    NextDown,
    /// Line to gain reached
    FirstDown,
    /// Points scored; the other team receives
    Score,
    Turnover,
    /// Fourth down failed
    TurnoverOnDowns,
    /// Kickoff, punt or missed field goal
    ChangeOfPossession,
    /// Penalty enforced, down replayed
    ReplayDown,
    /// Try after touchdown, no down consumed
    Try,
}

/// One outcome together with the game situation around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPlay {
    pub outcome: PlayOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_before: Option<u8>,
    pub distance_before: u8,
    pub possession_after: TeamId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_after: Option<u8>,
    pub distance_after: u8,
    pub score_after: Score,
    pub transition: Transition,
}

/// Score at the end of a quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterScore {
    pub quarter: Quarter,
    pub score: Score,
}

/// A play dropped from the history, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPlay {
    pub play_id: PlayId,
    pub reason: String,
}

/// Running state of one game. Owned by a single tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub info: GameInfo,
    pub phase: GamePhase,
    pub quarter: Quarter,
    /// `None` before the first scrimmage snap and during kickoffs.
    pub down: Option<u8>,
    pub distance: u8,
    pub possession: Option<TeamId>,
    pub position: Option<FieldPosition>,
    pub score: Score,
    pub history: Vec<AppliedPlay>,
    pub quarters: Vec<QuarterScore>,
    pub skipped: Vec<SkippedPlay>,
    pub warnings: Vec<String>,
}

impl GameState {
    pub fn new(info: GameInfo, first_down_distance: u8) -> Self {
        Self {
            info,
            phase: GamePhase::PreKickoff,
            quarter: Quarter::FIRST,
            down: None,
            distance: first_down_distance,
            possession: None,
            position: None,
            score: Score::default(),
            history: Vec::new(),
            quarters: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn points_for(&self, team: &TeamId) -> u16 {
        points_for(&self.info, &self.score, team)
    }

    pub(crate) fn add_points(&mut self, team: &TeamId, points: u16) {
        if team == &self.info.home {
            self.score.home += points;
        } else if team == &self.info.away {
            self.score.away += points;
        }
    }
}

fn points_for(info: &GameInfo, score: &Score, team: &TeamId) -> u16 {
    if team == &info.home {
        score.home
    } else if team == &info.away {
        score.away
    } else {
        0
    }
}

/// Frozen game, ready for season aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub info: GameInfo,
    pub final_score: Score,
    pub quarters: Vec<QuarterScore>,
    pub plays: Vec<AppliedPlay>,
    pub skipped: Vec<SkippedPlay>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Some plays could not be classified; the rest still count.
    pub incomplete: bool,
    /// The feed carried an explicit end-of-game marker.
    pub ended_explicitly: bool,
}

impl GameResult {
    pub fn game_id(&self) -> &GameId {
        &self.info.game_id
    }

    pub fn points_for(&self, team: &TeamId) -> u16 {
        points_for(&self.info, &self.final_score, team)
    }

    /// `None` for a tie.
    pub fn winner(&self) -> Option<&TeamId> {
        match self.final_score.home.cmp(&self.final_score.away) {
            std::cmp::Ordering::Greater => Some(&self.info.home),
            std::cmp::Ordering::Less => Some(&self.info.away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &PlayOutcome> {
        self.plays.iter().map(|p| &p.outcome)
    }
}
