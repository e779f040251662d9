//! Raw counters and the rates derived from them.
//!
//! Counters are plain sums so that adding them is associative and
//! commutative. Rates are never stored; they are recomputed from the
//! counters on every read.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatCounters {
    pub games_played: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub touchdowns: u32,
    /// Offensive snaps: runs, passes and sacks
    pub offensive_plays: u32,
    /// Net scrimmage yards (rushing + passing - sack yards)
    pub total_yards: i64,

    // Rushing
    pub rushing_attempts: u32,
    pub rushing_yards: i64,

    // Passing
    pub pass_completions: u32,
    pub pass_attempts: u32,
    pub passing_yards: i64,
    pub sacks_taken: u32,
    pub sack_yards: i64,

    // Special teams
    pub punts: u32,
    pub punt_yards: i64,
    pub punt_touchbacks: u32,
    pub punts_inside_20: u32,
    pub return_yards: i64,
    pub field_goals_attempted: u32,
    pub field_goals_made: u32,
    pub extra_points_attempted: u32,
    pub extra_points_made: u32,
    pub two_point_attempted: u32,
    pub two_point_made: u32,

    // Discipline
    pub turnovers: u32,
    pub penalties: u32,
    pub penalty_yards: i64,
}

impl AddAssign<&StatCounters> for StatCounters {
    fn add_assign(&mut self, rhs: &StatCounters) {
        self.games_played += rhs.games_played;
        self.points_for += rhs.points_for;
        self.points_against += rhs.points_against;
        self.touchdowns += rhs.touchdowns;
        self.offensive_plays += rhs.offensive_plays;
        self.total_yards += rhs.total_yards;
        self.rushing_attempts += rhs.rushing_attempts;
        self.rushing_yards += rhs.rushing_yards;
        self.pass_completions += rhs.pass_completions;
        self.pass_attempts += rhs.pass_attempts;
        self.passing_yards += rhs.passing_yards;
        self.sacks_taken += rhs.sacks_taken;
        self.sack_yards += rhs.sack_yards;
        self.punts += rhs.punts;
        self.punt_yards += rhs.punt_yards;
        self.punt_touchbacks += rhs.punt_touchbacks;
        self.punts_inside_20 += rhs.punts_inside_20;
        self.return_yards += rhs.return_yards;
        self.field_goals_attempted += rhs.field_goals_attempted;
        self.field_goals_made += rhs.field_goals_made;
        self.extra_points_attempted += rhs.extra_points_attempted;
        self.extra_points_made += rhs.extra_points_made;
        self.two_point_attempted += rhs.two_point_attempted;
        self.two_point_made += rhs.two_point_made;
        self.turnovers += rhs.turnovers;
        self.penalties += rhs.penalties;
        self.penalty_yards += rhs.penalty_yards;
    }
}

/// Rate statistics computed on read. A zero denominator yields 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonRates {
    pub yards_per_game: f64,
    pub points_per_game: f64,
    pub yards_per_carry: f64,
    pub yards_per_completion: f64,
    pub completion_percentage: f64,
    /// Punt touchbacks / punts, as a percentage
    pub touchback_percentage: f64,
    /// Turnovers / offensive plays
    pub turnover_rate: f64,
    pub penalty_yards_per_game: f64,
}

fn ratio(numerator: f64, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

impl StatCounters {
    pub fn rates(&self) -> SeasonRates {
        SeasonRates {
            yards_per_game: ratio(self.total_yards as f64, self.games_played),
            points_per_game: ratio(self.points_for as f64, self.games_played),
            yards_per_carry: ratio(self.rushing_yards as f64, self.rushing_attempts),
            yards_per_completion: ratio(self.passing_yards as f64, self.pass_completions),
            completion_percentage: ratio(self.pass_completions as f64 * 100.0, self.pass_attempts),
            touchback_percentage: ratio(self.punt_touchbacks as f64 * 100.0, self.punts),
            turnover_rate: ratio(self.turnovers as f64, self.offensive_plays),
            penalty_yards_per_game: ratio(self.penalty_yards as f64, self.games_played),
        }
    }
}
