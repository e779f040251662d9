//! # Play Outcome Classifier
//!
//! Turns one [`PlayEvent`] into a [`PlayOutcome`]. Pure and deterministic:
//! no shared state, so any number of events can be classified in parallel.
//!
//! ## Algorithm
//! 1. Reject tag sets that contradict the play type (`Malformed`)
//! 2. Collect score deltas: touchdown, conversion, field goal, safety
//! 3. Detect turnovers (interception, defensive fumble recovery, bare tag)
//! 4. Kick geometry: field-goal distance/range, punt inside-20/touchback
//! 5. Yardage: net gain, tackle for loss, penalty, returns

use crate::error::ClassificationError;
use crate::models::{
    FieldGoalAttempt, FieldGoalRange, FieldPosition, PlayEvent, PlayOutcome, PlayType,
    ScoreDelta, ScoreKind, Side, SignificantPlay, TeamId, TurnoverKind,
};

use super::config::RulesConfig;

/// Field-goal distance with the default geometry (10-yard end zone, 7-yard snap).
///
/// `OPP y` → `y + 17`, `OWN y` → `(50 - y) + 50 + 17`.
pub fn field_goal_distance(spot: &FieldPosition) -> u16 {
    field_goal_distance_with(spot, RulesConfig::default().field_goal_offset())
}

fn field_goal_distance_with(spot: &FieldPosition, offset: u16) -> u16 {
    let yard = spot.yard() as u16;
    match spot.side() {
        Side::Opp => yard + offset,
        Side::Own => (50 - yard) + 50 + offset,
    }
}

/// Band for a field-goal distance. See [`FieldGoalRange::from_distance`].
pub fn field_goal_range(distance: u16) -> Option<FieldGoalRange> {
    FieldGoalRange::from_distance(distance)
}

/// A gain of zero is not a loss.
pub fn is_tackle_for_loss(net_yards: i32) -> bool {
    net_yards < 0
}

/// `(inside_20, touchback)` for where a punt ended. A touchback is never
/// also reported as inside the 20.
pub fn punt_result(end: &FieldPosition, inside_yard: u8) -> (bool, bool) {
    if end.side() != Side::Opp {
        return (false, false);
    }
    let touchback = end.yard() == 0;
    let inside = !touchback && end.yard() <= inside_yard;
    (inside, touchback)
}

/// Classifies with the default rules.
pub fn classify(event: &PlayEvent) -> Result<PlayOutcome, ClassificationError> {
    Classifier::default().classify(event)
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: RulesConfig,
}

impl Classifier {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn classify(&self, event: &PlayEvent) -> Result<PlayOutcome, ClassificationError> {
        check_consistency(event)?;

        let turnover = detect_turnover(event);
        let scores = score_deltas(event, turnover.is_some());

        let missed_field_goal =
            event.play_type == PlayType::FieldGoal && !event.has(SignificantPlay::FieldGoalGood);
        let changes_hands = turnover.is_some() || event.play_type.is_kick() || missed_field_goal;
        let new_possession = changes_hands.then(|| event.defense.clone());

        let field_goal = (event.play_type == PlayType::FieldGoal).then(|| {
            let distance = event
                .end
                .or(event.start)
                .map(|spot| field_goal_distance_with(&spot, self.config.field_goal_offset()));
            FieldGoalAttempt {
                distance,
                range: distance.and_then(field_goal_range),
                good: event.has(SignificantPlay::FieldGoalGood),
            }
        });

        let (punt_inside_20, punt_touchback) = match (event.play_type, &event.end) {
            (PlayType::Punt, Some(end)) => punt_result(end, self.config.punt_inside_yard),
            _ => (false, false),
        };

        let net_yards = event.net_yards();
        let tackle_for_loss = event.play_type.has_ball_carrier() && is_tackle_for_loss(net_yards);
        let sack = event.play_type == PlayType::Sack || event.has(SignificantPlay::Sack);

        let penalty = event
            .has(SignificantPlay::Penalty)
            .then(|| event.penalty_yards.unwrap_or(0));

        let return_yards = event.return_yards.unwrap_or(0);
        let returning_team = returning_team(event, turnover.is_some(), return_yards);

        Ok(PlayOutcome {
            play_id: event.id.clone(),
            quarter: event.quarter,
            offense: event.offense.clone(),
            defense: event.defense.clone(),
            play_type: event.play_type,
            down: event.down,
            yards_to_go: event.yards_to_go,
            start: event.start,
            end: event.end,
            scores,
            turnover,
            new_possession,
            field_goal,
            tackle_for_loss,
            sack,
            punt_inside_20,
            punt_touchback,
            net_yards,
            penalty,
            return_yards,
            returning_team,
            unrecognized_tags: event.unrecognized_tags.clone(),
        })
    }
}

fn check_consistency(event: &PlayEvent) -> Result<(), ClassificationError> {
    use SignificantPlay as Tag;

    let has = |tag| event.has(tag);
    let play_type = event.play_type;
    let malformed = |reason: String| -> Result<(), ClassificationError> {
        Err(ClassificationError::malformed(&event.id, reason))
    };

    for (good, no_good) in [
        (Tag::FieldGoalGood, Tag::FieldGoalNoGood),
        (Tag::PatGood, Tag::PatNoGood),
        (Tag::TwoPointGood, Tag::TwoPointNoGood),
    ] {
        if has(good) && has(no_good) {
            return malformed(format!("both {good} and {no_good}"));
        }
    }

    if (has(Tag::FieldGoalGood) || has(Tag::FieldGoalNoGood)) && play_type != PlayType::FieldGoal {
        return malformed(format!("field goal tag on a {play_type} play"));
    }

    // Conversion tags ride on their own try, or on the touchdown clip that preceded it.
    let touchdown = has(Tag::Touchdown);
    if (has(Tag::PatGood) || has(Tag::PatNoGood))
        && play_type != PlayType::ExtraPoint
        && !touchdown
    {
        return malformed(format!("extra point tag on a {play_type} play"));
    }
    if (has(Tag::TwoPointGood) || has(Tag::TwoPointNoGood))
        && play_type != PlayType::TwoPoint
        && !touchdown
    {
        return malformed(format!("two-point tag on a {play_type} play"));
    }
    if touchdown && matches!(play_type, PlayType::ExtraPoint | PlayType::FieldGoal) {
        return malformed(format!("touchdown tag on a {play_type} play"));
    }

    if has(Tag::FumbleRecoveredByOffense) && has(Tag::FumbleRecoveredByDefense) {
        return malformed("fumble recovered by both offense and defense".to_string());
    }

    if has(Tag::Interception) && !(play_type.is_pass() || play_type == PlayType::TwoPoint) {
        return malformed(format!("interception on a {play_type} play"));
    }

    Ok(())
}

fn detect_turnover(event: &PlayEvent) -> Option<TurnoverKind> {
    if event.has(SignificantPlay::Interception) {
        Some(TurnoverKind::Interception)
    } else if event.has(SignificantPlay::FumbleRecoveredByDefense) {
        Some(TurnoverKind::Fumble)
    } else if event.has(SignificantPlay::Turnover) {
        Some(TurnoverKind::Unknown)
    } else {
        None
    }
}

/// Deltas in scoring order: touchdown, conversion, field goal, safety.
fn score_deltas(event: &PlayEvent, turnover: bool) -> Vec<ScoreDelta> {
    let offense = &event.offense;
    let defense = &event.defense;
    let mut scores = Vec::new();

    // A touchdown on a turnover play is a return score for the recovering team.
    let touchdown_team = if turnover { defense } else { offense };

    if event.has(SignificantPlay::Touchdown) {
        scores.push(ScoreDelta::new(touchdown_team.clone(), ScoreKind::Touchdown));
    }
    if event.has(SignificantPlay::TwoPointGood) {
        let team = if event.has(SignificantPlay::Touchdown) { touchdown_team } else { offense };
        scores.push(ScoreDelta::new(team.clone(), ScoreKind::TwoPointConversion));
    }
    if event.has(SignificantPlay::PatGood) {
        let team = if event.has(SignificantPlay::Touchdown) { touchdown_team } else { offense };
        scores.push(ScoreDelta::new(team.clone(), ScoreKind::ExtraPoint));
    }
    if event.has(SignificantPlay::FieldGoalGood) {
        scores.push(ScoreDelta::new(offense.clone(), ScoreKind::FieldGoal));
    }
    // After a change of possession the original offense is defending its goal.
    let safety_team = if turnover { offense } else { defense };

    if event.has(SignificantPlay::Safety) {
        scores.push(ScoreDelta::new(safety_team.clone(), ScoreKind::Safety));
    }

    scores
}

fn returning_team(event: &PlayEvent, turnover: bool, return_yards: u16) -> Option<TeamId> {
    if return_yards == 0 {
        return None;
    }
    if turnover || event.play_type.is_kick() || event.play_type == PlayType::FieldGoal {
        Some(event.defense.clone())
    } else {
        None
    }
}
