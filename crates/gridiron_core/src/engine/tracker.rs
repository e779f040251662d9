//! # Game State Tracker
//!
//! Single-owner state machine for one game:
//!
//! ```text
//! PreKickoff ──first play──► InProgress ──end_game()/finish()──► Final
//! ```
//!
//! Plays are applied strictly in feed order; each transition depends on the
//! previous down, distance and possession, so one game is never split across
//! threads. Independent games run in parallel via [`process_games_parallel`].
//!
//! Bad plays never abort a game: they land in the skipped-play log, the game
//! is flagged incomplete and the next play is processed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SkipReason, TrackerError};
use crate::models::{
    AppliedPlay, FieldPosition, GameInfo, GamePhase, GameResult, GameState, PlayEvent, PlayId,
    PlayOutcome, PlayRecord, QuarterScore, SkippedPlay, TeamId, Transition,
};

use super::classifier::Classifier;
use super::config::RulesConfig;

/// One entry of the inbound per-game feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEntry {
    Play(PlayRecord),
    EndOfQuarter,
    EndOfGame,
}

/// A game's identity together with its ordered feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameFeed {
    pub game: GameInfo,
    pub feed: Vec<FeedEntry>,
}

/// What happened to a play handed to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayDisposition {
    Applied(Transition),
    Skipped(SkipReason),
}

impl PlayDisposition {
    pub fn is_applied(&self) -> bool {
        matches!(self, PlayDisposition::Applied(_))
    }
}

pub struct GameTracker {
    classifier: Classifier,
    state: GameState,
    ended_explicitly: bool,
}

impl GameTracker {
    pub fn new(info: GameInfo, config: RulesConfig) -> Self {
        debug_assert!(info.validate().is_ok(), "{:?}", info.validate());
        let state = GameState::new(info, config.first_down_distance);
        Self { classifier: Classifier::new(config), state, ended_explicitly: false }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_final(&self) -> bool {
        self.state.phase == GamePhase::Final
    }

    fn config(&self) -> &RulesConfig {
        self.classifier.config()
    }

    fn ensure_open(&self, entry: impl FnOnce() -> String) -> Result<(), TrackerError> {
        if self.is_final() {
            let entry = entry();
            warn!(game_id = %self.state.info.game_id, "late {entry} after final, rejected");
            return Err(TrackerError::GameAlreadyFinalized {
                game_id: self.state.info.game_id.clone(),
                entry,
            });
        }
        Ok(())
    }

    /// Validates a wire record, then classifies and applies it.
    pub fn process_record(&mut self, record: PlayRecord) -> Result<PlayDisposition, TrackerError> {
        self.ensure_open(|| format!("play {}", record.id))?;
        let play_id = record.id.clone();
        match PlayEvent::from_record(record) {
            Ok(event) => self.process_event(&event),
            Err(e) => Ok(self.skip(play_id, SkipReason::from(e))),
        }
    }

    pub fn process_event(&mut self, event: &PlayEvent) -> Result<PlayDisposition, TrackerError> {
        self.ensure_open(|| format!("play {}", event.id))?;

        if event.game_id != self.state.info.game_id {
            let reason = SkipReason::WrongGame {
                play_id: event.id.clone(),
                expected: self.state.info.game_id.clone(),
                found: event.game_id.clone(),
            };
            return Ok(self.skip(event.id.clone(), reason));
        }

        match self.classifier.classify(event) {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(e) => Ok(self.skip(event.id.clone(), SkipReason::from(e))),
        }
    }

    /// Applies an already classified outcome.
    pub fn apply_outcome(&mut self, outcome: PlayOutcome) -> Result<PlayDisposition, TrackerError> {
        self.ensure_open(|| format!("play {}", outcome.play_id))?;

        if let Some(reason) = self.reject_reason(&outcome) {
            return Ok(self.skip(outcome.play_id.clone(), reason));
        }

        if self.state.phase == GamePhase::PreKickoff {
            self.state.phase = GamePhase::InProgress;
        }
        while self.state.quarter < outcome.quarter {
            self.advance_quarter();
        }

        for tag in &outcome.unrecognized_tags {
            self.state.warnings.push(format!("play {}: ignored tag {tag:?}", outcome.play_id));
        }

        let transition = self.transition(&outcome);
        Ok(PlayDisposition::Applied(transition))
    }

    fn reject_reason(&self, outcome: &PlayOutcome) -> Option<SkipReason> {
        let info = &self.state.info;
        for team in [&outcome.offense, &outcome.defense] {
            if !info.involves(team) {
                return Some(SkipReason::TeamNotInGame {
                    play_id: outcome.play_id.clone(),
                    team: team.clone(),
                });
            }
        }
        if outcome.quarter < self.state.quarter {
            return Some(SkipReason::QuarterRegression {
                play_id: outcome.play_id.clone(),
                current: self.state.quarter,
                found: outcome.quarter,
            });
        }
        None
    }

    fn skip(&mut self, play_id: PlayId, reason: SkipReason) -> PlayDisposition {
        warn!(game_id = %self.state.info.game_id, %play_id, "skipping play: {reason}");
        self.state.skipped.push(SkippedPlay { play_id, reason: reason.to_string() });
        PlayDisposition::Skipped(reason)
    }

    /// Series reset: first and ten, or first and goal inside the line to gain.
    fn first_down_distance(&self, position: Option<&FieldPosition>) -> u8 {
        let full = self.config().first_down_distance;
        match position {
            Some(spot) => spot.yards_to_goal().clamp(1, full as i32) as u8,
            None => full,
        }
    }

    fn transition(&mut self, outcome: &PlayOutcome) -> Transition {
        let offense = outcome.offense.clone();
        let defense = outcome.defense.clone();

        let same_series = self.state.possession.as_ref() == Some(&offense);
        if !same_series && self.state.possession.is_some() {
            debug!(
                game_id = %self.state.info.game_id,
                play_id = %outcome.play_id,
                "possession resynced to {offense}, new series"
            );
        }

        // Spot at the snap, relative to the offense.
        let tracked = if same_series { self.state.position } else { None };
        let snap_spot = outcome.start.or(tracked);
        let spot_after = outcome.end.or_else(|| snap_spot.map(|s| s.advanced(outcome.net_yards)));

        // A new offense never inherits the previous series; the feed's own
        // down and distance win when present.
        let (down_before, distance_before) = if same_series {
            (self.state.down, self.state.distance)
        } else {
            let distance = match outcome.yards_to_go {
                Some(to_go) if to_go > 0 => to_go,
                _ => self.first_down_distance(snap_spot.as_ref()),
            };
            let down = outcome.down.filter(|d| (1..=self.config().max_downs).contains(d));
            (down.or(Some(1)), distance)
        };

        for delta in &outcome.scores {
            self.state.add_points(&delta.team, delta.points);
        }

        let (transition, possession, position, down) = if let Some(last) =
            outcome.last_scoring_team()
        {
            // Post-score kickoff: the team scored on receives.
            let receiver = if last == &offense { defense } else { offense };
            (Transition::Score, receiver, None, 1)
        } else if outcome.is_turnover() {
            let receiver = outcome.new_possession.clone().unwrap_or(defense);
            (Transition::Turnover, receiver, spot_after.map(|s| s.flipped()), 1)
        } else if outcome.play_type.is_try() {
            (Transition::Try, defense, None, 1)
        } else if let Some(receiver) = outcome.new_possession.clone() {
            let spot = if outcome.punt_touchback {
                FieldPosition::own(self.config().touchback_yard).ok()
            } else {
                spot_after.map(|s| s.flipped())
            };
            (Transition::ChangeOfPossession, receiver, spot, 1)
        } else if let Some(penalty) = outcome.penalty {
            return self.enforce_penalty(outcome, penalty, snap_spot, down_before, distance_before);
        } else if !outcome.play_type.is_scrimmage() {
            (Transition::ReplayDown, offense, snap_spot, down_before.unwrap_or(1))
        } else if outcome.net_yards >= distance_before as i32 {
            (Transition::FirstDown, offense, spot_after, 1)
        } else {
            let next = down_before.unwrap_or(1) + 1;
            if next > self.config().max_downs {
                (Transition::TurnoverOnDowns, defense, spot_after.map(|s| s.flipped()), 1)
            } else {
                let remaining = (distance_before as i32 - outcome.net_yards).clamp(1, 99) as u8;
                self.state.distance = remaining;
                self.state.down = Some(next);
                self.state.possession = Some(offense);
                self.state.position = spot_after;
                return self.record(outcome, down_before, distance_before, Transition::NextDown);
            }
        };

        self.state.distance = self.first_down_distance(position.as_ref());
        self.state.down = Some(down);
        self.state.possession = Some(possession);
        self.state.position = position;
        self.record(outcome, down_before, distance_before, transition)
    }

    /// Penalty plays replay the down from the enforced spot.
    fn enforce_penalty(
        &mut self,
        outcome: &PlayOutcome,
        penalty: i16,
        snap_spot: Option<FieldPosition>,
        down_before: Option<u8>,
        distance_before: u8,
    ) -> Transition {
        let penalty = penalty as i32;
        let spot = snap_spot.map(|s| s.advanced(penalty));
        let remaining = distance_before as i32 - penalty;

        let transition = if remaining <= 0 {
            self.state.down = Some(1);
            self.state.distance = self.first_down_distance(spot.as_ref());
            Transition::FirstDown
        } else {
            self.state.down = Some(down_before.unwrap_or(1));
            self.state.distance = remaining.min(99) as u8;
            Transition::ReplayDown
        };
        self.state.possession = Some(outcome.offense.clone());
        self.state.position = spot;
        self.record(outcome, down_before, distance_before, transition)
    }

    fn record(
        &mut self,
        outcome: &PlayOutcome,
        down_before: Option<u8>,
        distance_before: u8,
        transition: Transition,
    ) -> Transition {
        debug_assert!(self.state.down.map_or(true, |d| d >= 1 && d <= self.config().max_downs));
        debug_assert!(self.state.distance >= 1);

        let possession_after = self
            .state
            .possession
            .clone()
            .unwrap_or_else(|| outcome.offense.clone());
        debug!(
            game_id = %self.state.info.game_id,
            play_id = %outcome.play_id,
            ?transition,
            down = ?self.state.down,
            distance = self.state.distance,
            "play applied"
        );
        self.state.history.push(AppliedPlay {
            outcome: outcome.clone(),
            down_before,
            distance_before,
            possession_after,
            down_after: self.state.down,
            distance_after: self.state.distance,
            score_after: self.state.score,
            transition,
        });
        transition
    }

    fn close_quarter(&mut self) {
        let quarter = self.state.quarter;
        if self.state.quarters.last().map(|q| q.quarter) != Some(quarter) {
            self.state.quarters.push(QuarterScore { quarter, score: self.state.score });
        }
    }

    fn advance_quarter(&mut self) {
        self.close_quarter();
        self.state.quarter = self.state.quarter.next();
        debug!(game_id = %self.state.info.game_id, quarter = %self.state.quarter, "quarter start");
    }

    /// Explicit end-of-quarter marker from the feed. Score carries over.
    pub fn end_quarter(&mut self) -> Result<(), TrackerError> {
        self.ensure_open(|| "end-of-quarter marker".to_string())?;
        self.advance_quarter();
        Ok(())
    }

    /// Explicit end-of-game marker. Later entries are rejected.
    pub fn end_game(&mut self) -> Result<(), TrackerError> {
        self.ensure_open(|| "end-of-game marker".to_string())?;
        self.close_quarter();
        self.state.phase = GamePhase::Final;
        self.ended_explicitly = true;
        Ok(())
    }

    /// Freezes the game. Without an explicit marker, stream exhaustion ends it.
    pub fn finish(mut self) -> GameResult {
        if !self.is_final() {
            self.close_quarter();
            self.state.phase = GamePhase::Final;
        }
        let regulation = self.config().regulation_quarters;
        let state = self.state;
        if state.quarter.0 < regulation {
            warn!(
                game_id = %state.info.game_id,
                quarter = %state.quarter,
                "feed ended before the last regulation quarter"
            );
        }

        let result = GameResult {
            incomplete: !state.skipped.is_empty(),
            ended_explicitly: self.ended_explicitly,
            final_score: state.score,
            quarters: state.quarters,
            plays: state.history,
            skipped: state.skipped,
            warnings: state.warnings,
            info: state.info,
        };
        info!(
            game_id = %result.info.game_id,
            home = %result.info.home,
            away = %result.info.away,
            home_score = result.final_score.home,
            away_score = result.final_score.away,
            plays = result.plays.len(),
            skipped = result.skipped.len(),
            "game final"
        );
        result
    }

    /// Drives a whole feed and freezes the result. Late entries are logged and dropped.
    pub fn run_feed(
        info: GameInfo,
        feed: impl IntoIterator<Item = FeedEntry>,
        config: RulesConfig,
    ) -> GameResult {
        let mut tracker = GameTracker::new(info, config);
        for entry in feed {
            let applied = match entry {
                FeedEntry::Play(record) => tracker.process_record(record).map(|_| ()),
                FeedEntry::EndOfQuarter => tracker.end_quarter(),
                FeedEntry::EndOfGame => tracker.end_game(),
            };
            // A late entry must not sink the game; keep it with the result.
            if let Err(e) = applied {
                tracker.state.warnings.push(e.to_string());
            }
        }
        tracker.finish()
    }
}

/// Tracks independent games on the rayon pool. Result order follows input order.
pub fn process_games_parallel(feeds: Vec<GameFeed>, config: &RulesConfig) -> Vec<GameResult> {
    feeds
        .into_par_iter()
        .map(|GameFeed { game, feed }| GameTracker::run_feed(game, feed, config.clone()))
        .collect()
}

/// Team holding the ball after the last applied play.
pub fn possession_after(result: &GameResult) -> Option<&TeamId> {
    result.plays.last().map(|p| &p.possession_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayType, Score, SignificantPlay};

    fn info() -> GameInfo {
        GameInfo::new("g1", 2025, "HOME", "AWAY")
    }

    fn tracker() -> GameTracker {
        GameTracker::new(info(), RulesConfig::default())
    }

    fn home_play(id: &str, play_type: PlayType) -> PlayEvent {
        PlayEvent::new(id, "g1", "HOME", "AWAY", play_type)
    }

    fn away_play(id: &str, play_type: PlayType) -> PlayEvent {
        PlayEvent::new(id, "g1", "AWAY", "HOME", play_type)
    }

    fn own(yard: u8) -> FieldPosition {
        FieldPosition::own(yard).unwrap()
    }

    fn opp(yard: u8) -> FieldPosition {
        FieldPosition::opp(yard).unwrap()
    }

    fn home() -> TeamId {
        TeamId::from("HOME")
    }

    fn away() -> TeamId {
        TeamId::from("AWAY")
    }

    #[test]
    fn test_touchdown_scores_six_and_flips_possession() {
        let mut t = tracker();
        let td = home_play("p1", PlayType::Run)
            .from_spot(opp(8))
            .to_spot(opp(0))
            .with_tag(SignificantPlay::Touchdown);

        let disposition = t.process_event(&td).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::Score));

        let state = t.state();
        assert_eq!(state.score, Score { home: 6, away: 0 });
        assert_eq!(state.down, Some(1));
        assert_eq!(state.possession, Some(away()));
        assert_eq!(state.phase, GamePhase::InProgress);
    }

    #[test]
    fn test_interception_flips_possession_keeps_score() {
        let mut t = tracker();
        let pick = home_play("p1", PlayType::IncompletePass)
            .from_spot(own(30))
            .to_spot(opp(40))
            .with_tag(SignificantPlay::Interception);
        t.process_event(&pick).unwrap();

        let state = t.state();
        assert_eq!(state.score, Score::default());
        assert_eq!(state.possession, Some(away()));
        assert_eq!(state.down, Some(1));
        // ball spotted at HOME's opp 40, i.e. AWAY's own 40
        assert_eq!(state.position, Some(own(40)));
    }

    #[test]
    fn test_down_progression_and_first_down() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(own(25)).with_yards(4))
            .unwrap();
        assert_eq!(t.state().down, Some(2));
        assert_eq!(t.state().distance, 6);
        assert_eq!(t.state().position, Some(own(29)));

        t.process_event(&home_play("p2", PlayType::IncompletePass)).unwrap();
        assert_eq!(t.state().down, Some(3));
        assert_eq!(t.state().distance, 6);

        let disposition =
            t.process_event(&home_play("p3", PlayType::CompletedPass).with_yards(6)).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::FirstDown));
        assert_eq!(t.state().down, Some(1));
        assert_eq!(t.state().distance, 10);
        assert_eq!(t.state().position, Some(own(35)));
    }

    #[test]
    fn test_goal_to_go_distance() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(opp(20)).to_spot(opp(6)))
            .unwrap();
        assert_eq!(t.state().down, Some(1));
        assert_eq!(t.state().distance, 6);
    }

    #[test]
    fn test_turnover_on_downs() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(opp(40)).with_yards(1)).unwrap();
        t.process_event(&home_play("p2", PlayType::Run).with_yards(1)).unwrap();
        t.process_event(&home_play("p3", PlayType::Run).with_yards(1)).unwrap();
        assert_eq!(t.state().down, Some(4));
        let disposition = t.process_event(&home_play("p4", PlayType::Run).with_yards(1)).unwrap();

        assert_eq!(disposition, PlayDisposition::Applied(Transition::TurnoverOnDowns));
        assert_eq!(t.state().possession, Some(away()));
        assert_eq!(t.state().down, Some(1));
        assert_eq!(t.state().position, Some(own(36)));
    }

    #[test]
    fn test_penalty_replays_down() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(own(25)).with_yards(3)).unwrap();
        assert_eq!(t.state().down, Some(2));

        let holding = home_play("p2", PlayType::Run).with_yards(12).with_penalty(-10);
        let disposition = t.process_event(&holding).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::ReplayDown));
        assert_eq!(t.state().down, Some(2));
        assert_eq!(t.state().distance, 17);
        assert_eq!(t.state().position, Some(own(18)));

        let offside = home_play("p3", PlayType::None).with_penalty(5);
        t.process_event(&offside).unwrap();
        assert_eq!(t.state().down, Some(2));
        assert_eq!(t.state().distance, 12);
    }

    #[test]
    fn test_defensive_penalty_can_award_first_down() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(own(25)).with_yards(8)).unwrap();
        let interference = home_play("p2", PlayType::IncompletePass).with_penalty(15);
        let disposition = t.process_event(&interference).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::FirstDown));
        assert_eq!(t.state().down, Some(1));
        assert_eq!(t.state().position, Some(own(48)));
    }

    #[test]
    fn test_field_goal_and_safety_scoring() {
        let mut t = tracker();
        let fg = home_play("p1", PlayType::FieldGoal)
            .to_spot(opp(20))
            .with_tag(SignificantPlay::FieldGoalGood);
        t.process_event(&fg).unwrap();

        let safety = away_play("p2", PlayType::Run)
            .from_spot(own(1))
            .with_yards(-2)
            .with_tag(SignificantPlay::Safety);
        t.process_event(&safety).unwrap();

        assert_eq!(t.state().score, Score { home: 5, away: 0 });
        // HOME scored the safety, so AWAY receives the free kick
        assert_eq!(t.state().possession, Some(away()));
    }

    #[test]
    fn test_punt_changes_possession() {
        let mut t = tracker();
        let punt = home_play("p1", PlayType::Punt).from_spot(own(30)).to_spot(opp(15));
        let disposition = t.process_event(&punt).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::ChangeOfPossession));
        assert_eq!(t.state().possession, Some(away()));
        assert_eq!(t.state().position, Some(own(15)));
        assert_eq!(t.state().down, Some(1));
    }

    #[test]
    fn test_punt_touchback_spotted_at_touchback_yard() {
        let mut t = tracker();
        let punt = home_play("p1", PlayType::Punt).from_spot(own(40)).to_spot(opp(0));
        t.process_event(&punt).unwrap();
        assert_eq!(t.state().possession, Some(away()));
        assert_eq!(t.state().position, Some(own(20)));

        let rules = RulesConfig { touchback_yard: 25, ..RulesConfig::default() };
        let mut t = GameTracker::new(info(), rules);
        t.process_event(&punt).unwrap();
        assert_eq!(t.state().position, Some(own(25)));

        t.process_event(&away_play("p2", PlayType::Run).with_yards(5)).unwrap();
        assert_eq!(t.state().position, Some(own(30)));
    }

    #[test]
    fn test_new_offense_starts_fresh_series_after_skipped_punt() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(opp(40)).with_yards(1)).unwrap();
        t.process_event(&home_play("p2", PlayType::Run).with_yards(1)).unwrap();
        t.process_event(&home_play("p3", PlayType::Run).with_yards(1)).unwrap();
        assert_eq!(t.state().down, Some(4));

        // malformed punt never reaches the state machine
        let punt = home_play("p4", PlayType::Punt).with_tag(SignificantPlay::FieldGoalGood);
        assert!(!t.process_event(&punt).unwrap().is_applied());

        let run = away_play("p5", PlayType::Run).at_down(1, 10).with_yards(3);
        let disposition = t.process_event(&run).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::NextDown));
        assert_eq!(t.state().possession, Some(away()));
        assert_eq!(t.state().down, Some(2));
        assert_eq!(t.state().distance, 7);
        assert_eq!(t.state().position, None);
    }

    #[test]
    fn test_new_offense_without_feed_down_gets_first_and_ten() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).from_spot(own(25)).with_yards(2)).unwrap();
        t.process_event(&home_play("p2", PlayType::Run).with_yards(2)).unwrap();
        assert_eq!(t.state().down, Some(3));

        let run = away_play("p3", PlayType::Run).from_spot(own(30)).with_yards(4);
        t.process_event(&run).unwrap();
        let last = t.state().history.last().unwrap();
        assert_eq!(last.down_before, Some(1));
        assert_eq!(last.distance_before, 10);
        assert_eq!(t.state().down, Some(2));
        assert_eq!(t.state().distance, 6);
        assert_eq!(t.state().position, Some(own(34)));
    }

    #[test]
    fn test_try_after_touchdown() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).with_tag(SignificantPlay::Touchdown))
            .unwrap();
        let pat = home_play("p2", PlayType::ExtraPoint).with_tag(SignificantPlay::PatNoGood);
        let disposition = t.process_event(&pat).unwrap();
        assert_eq!(disposition, PlayDisposition::Applied(Transition::Try));
        assert_eq!(t.state().score, Score { home: 6, away: 0 });
        assert_eq!(t.state().possession, Some(away()));
    }

    #[test]
    fn test_quarter_advances_without_resetting_score() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).with_tag(SignificantPlay::Touchdown))
            .unwrap();
        t.end_quarter().unwrap();
        t.process_event(&away_play("p2", PlayType::Run).in_quarter(3).with_yards(2)).unwrap();

        let state = t.state();
        assert_eq!(state.quarter.0, 3);
        assert_eq!(state.score.home, 6);
        let closed: Vec<u8> = state.quarters.iter().map(|q| q.quarter.0).collect();
        assert_eq!(closed, vec![1, 2]);
        assert_eq!(state.quarters[0].score, Score { home: 6, away: 0 });
    }

    #[test]
    fn test_quarter_regression_is_skipped() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run).in_quarter(2)).unwrap();
        let disposition = t.process_event(&home_play("p2", PlayType::Run).in_quarter(1)).unwrap();
        assert!(matches!(
            disposition,
            PlayDisposition::Skipped(SkipReason::QuarterRegression { .. })
        ));
    }

    #[test]
    fn test_final_rejects_late_plays() {
        let mut t = tracker();
        t.process_event(&home_play("p1", PlayType::Run)).unwrap();
        t.end_game().unwrap();

        let err = t.process_event(&home_play("p2", PlayType::Run)).unwrap_err();
        assert!(matches!(err, TrackerError::GameAlreadyFinalized { .. }));
        assert!(t.end_quarter().is_err());

        let result = t.finish();
        assert!(result.ended_explicitly);
        assert_eq!(result.plays.len(), 1);
    }

    #[test]
    fn test_one_malformed_among_ten() {
        let mut t = tracker();
        for i in 0..10 {
            let mut event = home_play(&format!("p{i}"), PlayType::Run).with_yards(2);
            if i == 4 {
                event = event.with_tag(SignificantPlay::FieldGoalGood);
            }
            assert!(t.process_event(&event).is_ok());
        }
        let result = t.finish();
        assert_eq!(result.plays.len(), 9);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].play_id.as_str(), "p4");
        assert!(result.incomplete);
        assert!(!result.ended_explicitly);
    }

    #[test]
    fn test_foreign_team_and_game_are_skipped() {
        let mut t = tracker();
        let stranger = PlayEvent::new("p1", "g1", "HOME", "VISITOR", PlayType::Run);
        let wrong_game = PlayEvent::new("p2", "g2", "HOME", "AWAY", PlayType::Run);
        assert!(!t.process_event(&stranger).unwrap().is_applied());
        assert!(!t.process_event(&wrong_game).unwrap().is_applied());
        assert_eq!(t.state().skipped.len(), 2);
        assert_eq!(t.state().phase, GamePhase::PreKickoff);
    }

    #[test]
    fn test_run_feed_from_records() {
        let feed: Vec<FeedEntry> = serde_json::from_str(
            r#"[
                {"kind":"play","id":"k","game_id":"g1","quarter":1,"offense":"AWAY","defense":"HOME",
                 "play_type":"kickoff","end":{"side":"OPP","yard":25}},
                {"kind":"play","id":"r1","game_id":"g1","quarter":1,"down":1,"yards_to_go":10,
                 "offense":"HOME","defense":"AWAY","play_type":"run","yards":75,
                 "significant_plays":["touchdown","big_play"]},
                {"kind":"play","id":"x","game_id":"g1","quarter":1,"offense":"HOME","defense":"AWAY",
                 "play_type":"extra_point","significant_plays":["pat_good"]},
                {"kind":"play","id":"bad","game_id":"g1","quarter":2,"offense":"AWAY","defense":"HOME",
                 "play_type":"flea_flicker"},
                {"kind":"end_of_quarter"},
                {"kind":"end_of_game"},
                {"kind":"play","id":"late","game_id":"g1","quarter":4,"offense":"AWAY","defense":"HOME",
                 "play_type":"run"}
            ]"#,
        )
        .unwrap();

        let result = GameTracker::run_feed(info(), feed, RulesConfig::default());
        assert_eq!(result.final_score, Score { home: 7, away: 0 });
        assert_eq!(result.winner(), Some(&home()));
        assert_eq!(result.plays.len(), 3);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.incomplete);
        assert!(result.ended_explicitly);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[1].contains("late"));
        assert_eq!(possession_after(&result), Some(&away()));
    }

    #[test]
    fn test_parallel_games_keep_order() {
        let feeds: Vec<GameFeed> = (0..8)
            .map(|i| {
                let game = GameInfo::new(format!("g{i}"), 2025, "HOME", "AWAY");
                let tds = (0..i)
                    .map(|n| {
                        let mut record = PlayRecord {
                            id: format!("g{i}-p{n}").as_str().into(),
                            game_id: game.game_id.clone(),
                            quarter: 1,
                            down: None,
                            yards_to_go: None,
                            offense: home(),
                            defense: away(),
                            play_type: "run".to_string(),
                            start: None,
                            end: None,
                            significant_plays: vec![],
                            score_before: None,
                            yards: None,
                            penalty_yards: None,
                            return_yards: None,
                        };
                        record.significant_plays.push("touchdown".to_string());
                        FeedEntry::Play(record)
                    })
                    .collect();
                GameFeed { game, feed: tds }
            })
            .collect();

        let results = process_games_parallel(feeds, &RulesConfig::default());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.info.game_id.as_str(), format!("g{i}"));
            assert_eq!(result.final_score.home as usize, 6 * i);
        }
    }
}
