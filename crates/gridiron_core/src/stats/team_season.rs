use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::AggregationError;
use crate::models::{GameId, GameResult, TeamId};

use super::contribution::GameContribution;
use super::counters::{SeasonRates, StatCounters};

/// Season accumulator for one team. Counters only grow by whole-game
/// contributions; each game id is merged at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team: TeamId,
    pub season: u16,
    pub games: BTreeSet<GameId>,
    pub counters: StatCounters,
}

/// Outbound view: counters plus freshly derived rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonSnapshot {
    pub team: TeamId,
    pub season: u16,
    pub games: Vec<GameId>,
    #[serde(flatten)]
    pub counters: StatCounters,
    pub rates: SeasonRates,
}

impl TeamSeasonStats {
    pub fn new(team: TeamId, season: u16) -> Self {
        Self { team, season, games: BTreeSet::new(), counters: StatCounters::default() }
    }

    pub fn games_played(&self) -> u32 {
        self.counters.games_played
    }

    pub fn contains_game(&self, game_id: &GameId) -> bool {
        self.games.contains(game_id)
    }

    pub fn rates(&self) -> SeasonRates {
        self.counters.rates()
    }

    pub fn snapshot(&self) -> TeamSeasonSnapshot {
        TeamSeasonSnapshot {
            team: self.team.clone(),
            season: self.season,
            games: self.games.iter().cloned().collect(),
            counters: self.counters,
            rates: self.rates(),
        }
    }

    /// Checks a contribution without touching the counters.
    fn admit(&self, contribution: &GameContribution) -> Result<(), AggregationError> {
        if contribution.team != self.team {
            return Err(AggregationError::TeamNotInGame {
                team: self.team.clone(),
                game_id: contribution.game_id.clone(),
            });
        }
        if contribution.season != self.season {
            return Err(AggregationError::SeasonMismatch {
                game_id: contribution.game_id.clone(),
                expected: self.season,
                found: contribution.season,
            });
        }
        if self.contains_game(&contribution.game_id) {
            return Err(AggregationError::DuplicateGame {
                team: self.team.clone(),
                game_id: contribution.game_id.clone(),
            });
        }
        Ok(())
    }

    /// Adds one game's contribution. Rejected contributions leave `self` unchanged.
    pub fn apply(&mut self, contribution: &GameContribution) -> Result<(), AggregationError> {
        self.admit(contribution)?;
        self.games.insert(contribution.game_id.clone());
        self.counters += &contribution.counters;
        debug_assert_eq!(self.games.len() as u32, self.counters.games_played);
        Ok(())
    }

    /// In-place form of [`merge`].
    pub fn merge_game(&mut self, game: &GameResult) -> Result<(), AggregationError> {
        let contribution = GameContribution::extract(game, &self.team)?;
        self.apply(&contribution)
    }

    /// Combines two partial accumulators for the same team and season.
    /// Their game sets must be disjoint.
    pub fn combine(mut self, other: &TeamSeasonStats) -> Result<Self, AggregationError> {
        if self.team != other.team {
            return Err(AggregationError::TeamMismatch {
                left: self.team.clone(),
                right: other.team.clone(),
            });
        }
        if self.season != other.season {
            let game_id = other.games.iter().next().cloned().unwrap_or_else(|| GameId::from("-"));
            return Err(AggregationError::SeasonMismatch {
                game_id,
                expected: self.season,
                found: other.season,
            });
        }
        if let Some(game_id) = self.games.intersection(&other.games).next() {
            return Err(AggregationError::DuplicateGame {
                team: self.team.clone(),
                game_id: game_id.clone(),
            });
        }
        self.games.extend(other.games.iter().cloned());
        self.counters += &other.counters;
        Ok(self)
    }
}

/// Folds one finalized game into a team's season. Pure: `existing` is left
/// untouched, so a rejected merge (duplicate game, foreign team, other
/// season) keeps the caller's counters as they were.
pub fn merge(
    existing: &TeamSeasonStats,
    game: &GameResult,
    team: &TeamId,
) -> Result<TeamSeasonStats, AggregationError> {
    if team != &existing.team {
        return Err(AggregationError::TeamMismatch {
            left: existing.team.clone(),
            right: team.clone(),
        });
    }
    let contribution = GameContribution::extract(game, team)?;
    let mut next = existing.clone();
    next.apply(&contribution)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameTracker, RulesConfig};
    use crate::models::{GameInfo, GameResult, PlayEvent, PlayType, Score};

    /// One game in which HOME runs `carries` times for `yards_each`.
    fn rushing_game(id: &str, carries: u16, yards_each: i16) -> GameResult {
        let mut t =
            GameTracker::new(GameInfo::new(id, 2025, "HOME", "AWAY"), RulesConfig::default());
        for n in 0..carries {
            let play_id = format!("{id}-{n}");
            let play = PlayEvent::new(play_id.as_str(), id, "HOME", "AWAY", PlayType::Run)
                .with_yards(yards_each);
            t.process_event(&play).unwrap();
        }
        t.finish()
    }

    fn home() -> TeamId {
        TeamId::from("HOME")
    }

    #[test]
    fn test_merge_in_either_order() {
        let g1 = rushing_game("G1", 10, 10);
        let g2 = rushing_game("G2", 15, 10);
        let empty = TeamSeasonStats::new(home(), 2025);

        let forward = merge(&merge(&empty, &g1, &home()).unwrap(), &g2, &home()).unwrap();
        let backward = merge(&merge(&empty, &g2, &home()).unwrap(), &g1, &home()).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.counters.rushing_yards, 250);
        assert_eq!(forward.games_played(), 2);
        assert_eq!(forward.rates().yards_per_game, 125.0);
        assert_eq!(forward.rates().yards_per_carry, 10.0);
    }

    #[test]
    fn test_duplicate_game_rejected_and_unchanged() {
        let g1 = rushing_game("G1", 10, 10);
        let once = merge(&TeamSeasonStats::new(home(), 2025), &g1, &home()).unwrap();

        let err = merge(&once, &g1, &home()).unwrap_err();
        assert_eq!(
            err,
            AggregationError::DuplicateGame { team: home(), game_id: GameId::from("G1") }
        );
        assert!(err.is_recoverable());
        assert_eq!(once.counters.rushing_yards, 100);
        assert_eq!(once.games_played(), 1);

        let mut in_place = once.clone();
        assert!(in_place.merge_game(&g1).is_err());
        assert_eq!(in_place, once);
    }

    #[test]
    fn test_other_season_rejected() {
        let mut game = rushing_game("G9", 1, 5);
        game.info.season = 2024;
        let err = merge(&TeamSeasonStats::new(home(), 2025), &game, &home()).unwrap_err();
        assert!(matches!(err, AggregationError::SeasonMismatch { .. }));
    }

    #[test]
    fn test_merge_for_another_team_rejected() {
        let game = rushing_game("G1", 1, 5);
        let away = TeamId::from("AWAY");
        let err = merge(&TeamSeasonStats::new(home(), 2025), &game, &away).unwrap_err();
        assert_eq!(err, AggregationError::TeamMismatch { left: home(), right: away });
    }

    #[test]
    fn test_combine_partial_accumulators() {
        let mut left = TeamSeasonStats::new(home(), 2025);
        left.merge_game(&rushing_game("G1", 10, 10)).unwrap();
        let mut right = TeamSeasonStats::new(home(), 2025);
        right.merge_game(&rushing_game("G2", 15, 10)).unwrap();

        let combined = left.clone().combine(&right).unwrap();
        assert_eq!(combined.counters.rushing_yards, 250);
        assert_eq!(combined, right.clone().combine(&left).unwrap());

        let overlap = combined.clone().combine(&right).unwrap_err();
        assert!(matches!(overlap, AggregationError::DuplicateGame { .. }));
    }

    #[test]
    fn test_snapshot_flattens_counters() {
        let mut stats = TeamSeasonStats::new(home(), 2025);
        stats.merge_game(&rushing_game("G1", 4, 5)).unwrap();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["rushing_yards"], 20);
        assert_eq!(json["games_played"], 1);
        assert_eq!(json["rates"]["yards_per_carry"], 5.0);
        assert_eq!(json["games"][0], "G1");
    }

    #[test]
    fn test_incomplete_game_still_counts() {
        let mut game = rushing_game("G1", 3, 7);
        game.incomplete = true;
        game.final_score = Score { home: 0, away: 0 };
        let stats = merge(&TeamSeasonStats::new(home(), 2025), &game, &home()).unwrap();
        assert_eq!(stats.counters.rushing_yards, 21);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn contribution(i: usize, rushing: i64, penalties: u32) -> GameContribution {
        GameContribution {
            game_id: GameId::new(format!("G{i}")),
            season: 2025,
            team: TeamId::from("HOME"),
            counters: StatCounters {
                games_played: 1,
                rushing_attempts: 1,
                rushing_yards: rushing,
                total_yards: rushing,
                penalties,
                ..StatCounters::default()
            },
        }
    }

    proptest! {
        /// Property: the order games are merged in never changes the totals
        #[test]
        fn prop_merge_order_independent(
            games in prop::collection::vec((-20i64..200, 0u32..12), 1..12),
            seed in any::<u64>()
        ) {
            let contributions: Vec<_> = games
                .iter()
                .enumerate()
                .map(|(i, (r, p))| contribution(i, *r, *p))
                .collect();

            let mut forward = TeamSeasonStats::new(TeamId::from("HOME"), 2025);
            for c in &contributions {
                forward.apply(c).unwrap();
            }

            let mut shuffled = contributions.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
            let mut other = TeamSeasonStats::new(TeamId::from("HOME"), 2025);
            for c in &shuffled {
                other.apply(c).unwrap();
            }

            prop_assert_eq!(&forward, &other);
            prop_assert_eq!(forward.games_played() as usize, contributions.len());
        }

        /// Property: splitting the season anywhere and combining gives the same totals
        #[test]
        fn prop_combine_associative(
            games in prop::collection::vec((-20i64..200, 0u32..12), 2..12),
            split in 1usize..11
        ) {
            let contributions: Vec<_> = games
                .iter()
                .enumerate()
                .map(|(i, (r, p))| contribution(i, *r, *p))
                .collect();
            let split = split.min(contributions.len() - 1);

            let mut whole = TeamSeasonStats::new(TeamId::from("HOME"), 2025);
            let mut left = whole.clone();
            let mut right = whole.clone();
            for (i, c) in contributions.iter().enumerate() {
                whole.apply(c).unwrap();
                if i < split { left.apply(c).unwrap() } else { right.apply(c).unwrap() }
            }

            prop_assert_eq!(left.combine(&right).unwrap(), whole);
        }
    }
}
