//! Per-game, per-team counters extracted from a finalized game.
//!
//! Offensive counters (rushing, passing, turnovers, penalties) are credited
//! to the team on offense for the play. Return yards go to the returning
//! team whichever side it was on. Extraction is independent per game, so it
//! runs in parallel ahead of the merge.

use serde::{Deserialize, Serialize};

use crate::error::AggregationError;
use crate::models::{GameId, GameResult, PlayOutcome, PlayType, ScoreKind, TeamId};

use super::counters::StatCounters;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameContribution {
    pub game_id: GameId,
    pub season: u16,
    pub team: TeamId,
    pub counters: StatCounters,
}

impl GameContribution {
    pub fn extract(game: &GameResult, team: &TeamId) -> Result<Self, AggregationError> {
        let Some(opponent) = game.info.opponent_of(team) else {
            return Err(AggregationError::TeamNotInGame {
                team: team.clone(),
                game_id: game.info.game_id.clone(),
            });
        };

        Ok(Self::extract_unchecked(game, team, opponent))
    }

    /// Contributions for both teams of a game, home first.
    pub fn extract_both(game: &GameResult) -> [Self; 2] {
        let info = &game.info;
        [
            Self::extract_unchecked(game, &info.home, &info.away),
            Self::extract_unchecked(game, &info.away, &info.home),
        ]
    }

    fn extract_unchecked(game: &GameResult, team: &TeamId, opponent: &TeamId) -> Self {
        let mut counters = StatCounters {
            games_played: 1,
            points_for: game.points_for(team) as u32,
            points_against: game.points_for(opponent) as u32,
            ..StatCounters::default()
        };
        for outcome in game.outcomes() {
            credit_play(&mut counters, outcome, team);
        }
        Self {
            game_id: game.info.game_id.clone(),
            season: game.info.season,
            team: team.clone(),
            counters,
        }
    }
}

fn credit_play(counters: &mut StatCounters, outcome: &PlayOutcome, team: &TeamId) {
    counters.touchdowns += outcome
        .scores
        .iter()
        .filter(|s| &s.team == team && s.kind == ScoreKind::Touchdown)
        .count() as u32;

    if outcome.returning_team.as_ref() == Some(team) {
        counters.return_yards += outcome.return_yards as i64;
    }

    if &outcome.offense != team {
        return;
    }

    let net = outcome.net_yards as i64;
    match outcome.play_type {
        PlayType::Run => {
            counters.offensive_plays += 1;
            counters.rushing_attempts += 1;
            counters.rushing_yards += net;
            counters.total_yards += net;
        }
        PlayType::CompletedPass => {
            counters.offensive_plays += 1;
            counters.pass_attempts += 1;
            counters.pass_completions += 1;
            counters.passing_yards += net;
            counters.total_yards += net;
        }
        PlayType::IncompletePass => {
            counters.offensive_plays += 1;
            counters.pass_attempts += 1;
        }
        PlayType::Sack => {
            counters.offensive_plays += 1;
            counters.sacks_taken += 1;
            counters.sack_yards += -net;
            counters.total_yards += net;
        }
        PlayType::Punt => {
            counters.punts += 1;
            counters.punt_yards += net;
            counters.punt_touchbacks += outcome.punt_touchback as u32;
            counters.punts_inside_20 += outcome.punt_inside_20 as u32;
        }
        PlayType::FieldGoal => {
            counters.field_goals_attempted += 1;
            counters.field_goals_made += outcome.has_score(ScoreKind::FieldGoal) as u32;
        }
        PlayType::ExtraPoint | PlayType::TwoPoint | PlayType::Kickoff | PlayType::None => {}
    }

    // Tries can ride on their own snap or on the touchdown clip.
    let extra_point = outcome.has_score(ScoreKind::ExtraPoint);
    if outcome.play_type == PlayType::ExtraPoint || extra_point {
        counters.extra_points_attempted += 1;
        counters.extra_points_made += extra_point as u32;
    }
    let two_point = outcome.has_score(ScoreKind::TwoPointConversion);
    if outcome.play_type == PlayType::TwoPoint || two_point {
        counters.two_point_attempted += 1;
        counters.two_point_made += two_point as u32;
    }

    if outcome.is_turnover() {
        counters.turnovers += 1;
    }
    if let Some(yards) = outcome.penalty {
        counters.penalties += 1;
        counters.penalty_yards += (yards as i64).abs();
    }
}
