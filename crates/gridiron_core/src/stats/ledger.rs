//! Season-wide aggregation.
//!
//! Two entry points share the same merge rules:
//! - [`SeasonLedger`]: incremental, games arrive one by one and may be
//!   committed from several threads.
//! - [`aggregate_season`]: batch, per-game extraction and per-team folds run
//!   on the rayon pool, then partial accumulators are combined.
//!
//! Either way a game contributes to a team at most once.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AggregationError;
use crate::models::{GameId, GameResult, TeamId};

use super::contribution::GameContribution;
use super::team_season::{TeamSeasonSnapshot, TeamSeasonStats};

/// Season report: one snapshot per team plus any games that were refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season: u16,
    pub teams: BTreeMap<TeamId, TeamSeasonSnapshot>,
    #[serde(default)]
    pub rejected: Vec<String>,
}

impl SeasonReport {
    pub fn team(&self, team: &TeamId) -> Option<&TeamSeasonSnapshot> {
        self.teams.get(team)
    }
}

/// Shared incremental accumulator. Commits for different games may race;
/// each commit holds the lock only while folding precomputed counters.
#[derive(Debug)]
pub struct SeasonLedger {
    season: u16,
    teams: Mutex<HashMap<TeamId, TeamSeasonStats>>,
}

impl SeasonLedger {
    pub fn new(season: u16) -> Self {
        Self { season, teams: Mutex::new(HashMap::new()) }
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    /// Merges both teams of a finalized game. Returns the merges that were
    /// refused; the rest of the ledger is unaffected by them.
    pub fn commit(&self, game: &GameResult) -> Vec<AggregationError> {
        if let Err(e) = game.info.validate() {
            let err = AggregationError::from(e);
            warn!(game_id = %game.info.game_id, "{err}");
            return vec![err];
        }
        if game.info.season != self.season {
            let err = AggregationError::SeasonMismatch {
                game_id: game.info.game_id.clone(),
                expected: self.season,
                found: game.info.season,
            };
            warn!(game_id = %game.info.game_id, "{err}");
            return vec![err];
        }

        let contributions = GameContribution::extract_both(game);
        let mut rejected = Vec::new();
        {
            let mut teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
            for contribution in &contributions {
                let entry = teams.entry(contribution.team.clone()).or_insert_with(|| {
                    TeamSeasonStats::new(contribution.team.clone(), self.season)
                });
                if let Err(e) = entry.apply(contribution) {
                    rejected.push(e);
                }
            }
        }

        for err in &rejected {
            warn!(game_id = %game.info.game_id, "merge refused: {err}");
        }
        if rejected.is_empty() {
            debug!(game_id = %game.info.game_id, "game committed");
        }
        rejected
    }

    pub fn snapshot(&self, team: &TeamId) -> Option<TeamSeasonSnapshot> {
        let teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
        teams.get(team).map(TeamSeasonStats::snapshot)
    }

    pub fn teams(&self) -> Vec<TeamId> {
        let teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<TeamId> = teams.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn into_report(self) -> SeasonReport {
        let teams = self.teams.into_inner().unwrap_or_else(PoisonError::into_inner);
        SeasonReport {
            season: self.season,
            teams: teams.into_iter().map(|(id, stats)| (id, stats.snapshot())).collect(),
            rejected: Vec::new(),
        }
    }
}

/// Batch aggregation over a season's finalized games.
///
/// Duplicates and games from other seasons are filtered up front in input
/// order, so the first occurrence of a game id wins. The remaining work is
/// order independent.
pub fn aggregate_season(season: u16, games: &[GameResult]) -> SeasonReport {
    let mut seen: HashSet<&GameId> = HashSet::new();
    let mut rejected = Vec::new();
    let mut accepted = Vec::with_capacity(games.len());

    for game in games {
        let game_id = &game.info.game_id;
        if let Err(e) = game.info.validate() {
            warn!("{e}");
            rejected.push(e.to_string());
        } else if game.info.season != season {
            let err = AggregationError::SeasonMismatch {
                game_id: game_id.clone(),
                expected: season,
                found: game.info.season,
            };
            warn!("{err}");
            rejected.push(err.to_string());
        } else if !seen.insert(game_id) {
            warn!(%game_id, "duplicate game in season input, ignored");
            rejected.push(format!("game {game_id} appears more than once"));
        } else {
            accepted.push(game);
        }
    }

    let partials: Vec<HashMap<TeamId, TeamSeasonStats>> = accepted
        .par_iter()
        .map(|game| {
            GameContribution::extract_both(game)
                .into_iter()
                .map(|c| {
                    let mut stats = TeamSeasonStats::new(c.team.clone(), season);
                    let applied = stats.apply(&c);
                    debug_assert!(
                        applied.is_ok(),
                        "fresh accumulator refused {}: {applied:?}",
                        c.game_id
                    );
                    (c.team.clone(), stats)
                })
                .collect()
        })
        .collect();

    let mut totals: HashMap<TeamId, TeamSeasonStats> = HashMap::new();
    for partial in partials {
        for (team, stats) in partial {
            match totals.remove(&team) {
                None => {
                    totals.insert(team, stats);
                }
                Some(existing) => match existing.clone().combine(&stats) {
                    Ok(combined) => {
                        totals.insert(team, combined);
                    }
                    Err(e) => {
                        warn!("{e}");
                        rejected.push(e.to_string());
                        totals.insert(team, existing);
                    }
                },
            }
        }
    }

    info!(season, games = accepted.len(), teams = totals.len(), "season aggregated");
    SeasonReport {
        season,
        teams: totals.into_iter().map(|(id, stats)| (id, stats.snapshot())).collect(),
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameTracker, RulesConfig};
    use crate::models::{GameInfo, PlayEvent, PlayType, SignificantPlay};
    use std::sync::Arc;

    fn game(id: &str, home: &str, away: &str, home_rush: i16, home_td: bool) -> GameResult {
        let mut t = GameTracker::new(GameInfo::new(id, 2025, home, away), RulesConfig::default());
        let mut run = PlayEvent::new(format!("{id}-r").as_str(), id, home, away, PlayType::Run)
            .with_yards(home_rush);
        if home_td {
            run = run.with_tag(SignificantPlay::Touchdown);
        }
        t.process_event(&run).unwrap();
        let pass_id = format!("{id}-p");
        let pass = PlayEvent::new(pass_id.as_str(), id, away, home, PlayType::CompletedPass)
            .with_yards(12);
        t.process_event(&pass).unwrap();
        t.end_game().unwrap();
        t.finish()
    }

    #[test]
    fn test_ledger_commit_and_snapshot() {
        let ledger = SeasonLedger::new(2025);
        assert!(ledger.commit(&game("G1", "BEARS", "LIONS", 100, true)).is_empty());
        assert!(ledger.commit(&game("G2", "LIONS", "BEARS", 150, false)).is_empty());

        let bears = ledger.snapshot(&TeamId::from("BEARS")).unwrap();
        assert_eq!(bears.counters.games_played, 2);
        assert_eq!(bears.counters.rushing_yards, 100);
        assert_eq!(bears.counters.passing_yards, 12);
        assert_eq!(bears.counters.points_for, 6);
        assert_eq!(bears.rates.points_per_game, 3.0);

        let lions = ledger.snapshot(&TeamId::from("LIONS")).unwrap();
        assert_eq!(lions.counters.rushing_yards, 150);
        assert_eq!(lions.counters.points_against, 6);
        assert_eq!(ledger.teams(), vec![TeamId::from("BEARS"), TeamId::from("LIONS")]);
    }

    #[test]
    fn test_ledger_recommit_is_refused() {
        let ledger = SeasonLedger::new(2025);
        let g1 = game("G1", "BEARS", "LIONS", 100, false);
        ledger.commit(&g1);
        let before = ledger.snapshot(&TeamId::from("BEARS")).unwrap();

        let rejected = ledger.commit(&g1);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|e| matches!(e, AggregationError::DuplicateGame { .. })));
        assert_eq!(ledger.snapshot(&TeamId::from("BEARS")).unwrap(), before);
    }

    #[test]
    fn test_ledger_wrong_season() {
        let ledger = SeasonLedger::new(2024);
        let rejected = ledger.commit(&game("G1", "BEARS", "LIONS", 10, false));
        assert!(matches!(rejected[..], [AggregationError::SeasonMismatch { .. }]));
        assert!(ledger.teams().is_empty());
    }

    #[test]
    fn test_concurrent_commits() {
        let ledger = Arc::new(SeasonLedger::new(2025));
        let games: Vec<GameResult> =
            (0..16).map(|i| game(&format!("G{i}"), "BEARS", "LIONS", 10, false)).collect();

        std::thread::scope(|scope| {
            for chunk in games.chunks(4) {
                let ledger = Arc::clone(&ledger);
                scope.spawn(move || {
                    for g in chunk {
                        assert!(ledger.commit(g).is_empty());
                    }
                });
            }
        });

        let bears = ledger.snapshot(&TeamId::from("BEARS")).unwrap();
        assert_eq!(bears.counters.games_played, 16);
        assert_eq!(bears.counters.rushing_yards, 160);
        assert_eq!(bears.games.len(), 16);
    }

    #[test]
    fn test_batch_matches_incremental() {
        let games = vec![
            game("G1", "BEARS", "LIONS", 100, true),
            game("G2", "LIONS", "PACKERS", 80, false),
            game("G3", "PACKERS", "BEARS", 40, true),
            game("G4", "BEARS", "PACKERS", -3, false),
        ];

        let ledger = SeasonLedger::new(2025);
        for g in games.iter().rev() {
            ledger.commit(g);
        }
        let incremental = ledger.into_report();
        let batch = aggregate_season(2025, &games);

        assert_eq!(batch.teams, incremental.teams);
        assert!(batch.rejected.is_empty());
        assert_eq!(batch.team(&TeamId::from("BEARS")).unwrap().counters.games_played, 3);
    }

    #[test]
    fn test_batch_filters_duplicates_and_foreign_seasons() {
        let mut other = game("G9", "BEARS", "LIONS", 50, false);
        other.info.season = 2024;
        let games = vec![
            game("G1", "BEARS", "LIONS", 100, false),
            game("G1", "BEARS", "LIONS", 100, false),
            other,
        ];

        let report = aggregate_season(2025, &games);
        assert_eq!(report.rejected.len(), 2);
        let bears = report.team(&TeamId::from("BEARS")).unwrap();
        assert_eq!(bears.counters.games_played, 1);
        assert_eq!(bears.counters.rushing_yards, 100);
    }

    #[test]
    fn test_team_playing_itself_is_refused() {
        let mut broken = game("G2", "BEARS", "LIONS", 30, false);
        broken.info.away = TeamId::from("BEARS");
        let games = vec![game("G1", "BEARS", "LIONS", 100, false), broken.clone()];

        let report = aggregate_season(2025, &games);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.team(&TeamId::from("BEARS")).unwrap().counters.games_played, 1);

        let ledger = SeasonLedger::new(2025);
        let rejected = ledger.commit(&broken);
        assert!(matches!(rejected[..], [AggregationError::InvalidGame(_)]));
        assert!(ledger.teams().is_empty());
    }

    #[test]
    fn test_empty_season() {
        let report = aggregate_season(2025, &[]);
        assert!(report.teams.is_empty());
        assert!(report.rejected.is_empty());
    }
}
