//! Field geometry.
//!
//! A spot on the field is stored the way annotators call it: the half of the
//! field (relative to the offense) and the yard line within that half.
//!
//! ```text
//!   OWN goal                 midfield                 OPP goal
//!   |  OWN 0 ... OWN 49 | OWN 50 == OPP 50 | OPP 49 ... OPP 0 |
//!   yards_to_goal: 100 ...                 50                ... 0
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FieldPositionError;

/// Largest yard line inside one half of the field.
pub const MIDFIELD_YARD: u8 = 50;

/// Distance between the two goal lines.
pub const FIELD_LENGTH_YARDS: i32 = 100;

/// Half of the field, relative to the team in possession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// The offense's own half (its goal line is behind it)
    Own,
    /// The opponent's half
    Opp,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawFieldPosition {
    side: Side,
    yard: i32,
}

/// A validated spot on the field. `yard` is always within `0..=50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldPosition")]
pub struct FieldPosition {
    side: Side,
    yard: u8,
}

impl TryFrom<RawFieldPosition> for FieldPosition {
    type Error = FieldPositionError;

    fn try_from(raw: RawFieldPosition) -> Result<Self, Self::Error> {
        FieldPosition::new(raw.side, raw.yard)
    }
}

impl FieldPosition {
    pub fn new(side: Side, yard: i32) -> Result<Self, FieldPositionError> {
        if !(0..=MIDFIELD_YARD as i32).contains(&yard) {
            return Err(FieldPositionError::YardOutOfRange { yard });
        }
        Ok(Self { side, yard: yard as u8 })
    }

    pub fn own(yard: u8) -> Result<Self, FieldPositionError> {
        Self::new(Side::Own, yard as i32)
    }

    pub fn opp(yard: u8) -> Result<Self, FieldPositionError> {
        Self::new(Side::Opp, yard as i32)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn yard(&self) -> u8 {
        self.yard
    }

    /// Distance to the opponent's goal line (0..=100).
    pub fn yards_to_goal(&self) -> i32 {
        match self.side {
            Side::Opp => self.yard as i32,
            Side::Own => FIELD_LENGTH_YARDS - self.yard as i32,
        }
    }

    /// Inverse of [`yards_to_goal`](Self::yards_to_goal), clamped onto the field.
    /// Midfield is reported as `OPP 50`.
    pub fn from_yards_to_goal(yards_to_goal: i32) -> Self {
        let ytg = yards_to_goal.clamp(0, FIELD_LENGTH_YARDS);
        if ytg <= MIDFIELD_YARD as i32 {
            Self { side: Side::Opp, yard: ytg as u8 }
        } else {
            Self { side: Side::Own, yard: (FIELD_LENGTH_YARDS - ytg) as u8 }
        }
    }

    /// Moves the ball `gain` yards toward the opponent goal (negative = backwards).
    pub fn advanced(&self, gain: i32) -> Self {
        Self::from_yards_to_goal(self.yards_to_goal() - gain)
    }

    /// The same spot seen from the other team.
    pub fn flipped(&self) -> Self {
        Self::from_yards_to_goal(FIELD_LENGTH_YARDS - self.yards_to_goal())
    }

    /// Signed yards gained moving from `self` to `end`.
    pub fn gain_to(&self, end: &FieldPosition) -> i32 {
        self.yards_to_goal() - end.yards_to_goal()
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Own => write!(f, "OWN {}", self.yard),
            Side::Opp => write!(f, "OPP {}", self.yard),
        }
    }
}
