//! Round win probability from ratings and map history
//!
//! Three estimates are fused by weighted log-odds averaging:
//! the Elo expectation, the global win rate of side A's faction on the map,
//! and the two teams' own records on the map. The map factors only take
//! part when a map is given and has history.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EloSettings, ProbabilityWeights};
use crate::error::Result;
use crate::probability::map_stats::MapStatistics;
use crate::rating::{
    apply_map_bias, logistic_expectation, team_strength, RatingCalculator, WeightedEloCalculator,
};
use crate::season::Season;
use crate::types::{Faction, MapId, MapInfo, UnitId};
use crate::utils::{clamp_probability, inverse_logit, logit, shrink_toward_neutral};

/// Matchup to estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupQuery {
    pub team_a: Vec<UnitId>,
    pub team_b: Vec<UnitId>,
    #[serde(default)]
    pub map: Option<MapId>,
    /// Side B plays the Union
    #[serde(default)]
    pub flipped: bool,
    /// Index of the week being estimated; only earlier weeks are used
    pub before_week: usize,
}

/// Individual factor probabilities for side A; `None` means the factor had
/// no data and took no part in the fusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityFactors {
    pub elo: f64,
    pub global_map: Option<f64>,
    pub unit_map: Option<f64>,
}

/// Fused win probability. `prob_a + prob_b == 1` and both lie in [0.05, 0.95].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinProbability {
    pub prob_a: f64,
    pub prob_b: f64,
    pub factors: ProbabilityFactors,
}

impl WinProbability {
    /// Side A's chance as a whole percentage
    pub fn percent_a(&self) -> u32 {
        (self.prob_a * 100.0).round() as u32
    }

    /// Side B's chance as a whole percentage; always `100 - percent_a()`
    pub fn percent_b(&self) -> u32 {
        100 - self.percent_a()
    }
}

/// Win probability estimator
pub struct WinProbabilityEstimator {
    calculator: Box<dyn RatingCalculator>,
    elo: EloSettings,
    weights: ProbabilityWeights,
}

impl std::fmt::Debug for WinProbabilityEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinProbabilityEstimator")
            .field("calculator", &self.calculator.config())
            .field("weights", &self.weights)
            .finish()
    }
}

impl WinProbabilityEstimator {
    /// Estimator backed by the weighted Elo fold
    pub fn new(elo: EloSettings, weights: ProbabilityWeights) -> Result<Self> {
        let calculator = WeightedEloCalculator::new(elo.clone())?;
        Self::with_calculator(Box::new(calculator), elo, weights)
    }

    /// Estimator using another rating fold. `elo` still supplies the map
    /// bias table and the default headcount.
    pub fn with_calculator(
        calculator: Box<dyn RatingCalculator>,
        elo: EloSettings,
        weights: ProbabilityWeights,
    ) -> Result<Self> {
        elo.validate()?;
        weights.validate()?;
        Ok(Self {
            calculator,
            elo,
            weights,
        })
    }

    pub fn estimate(&self, season: &Season, query: &MatchupQuery) -> Result<WinProbability> {
        let prior = season.weeks_before(query.before_week);
        let target_week = season.weeks.get(query.before_week);
        let map_info = query.map.as_ref().map(|map| {
            target_week
                .and_then(|week| week.map_biases.get(map))
                .or_else(|| season.maps.get(map))
                .copied()
                .unwrap_or(MapInfo {
                    bias: Default::default(),
                    attacker: Faction::Confederate,
                })
        });

        // Elo factor
        let ratings = self.calculator.compute_ratings(&season.units, prior)?;
        let headcounts = season.headcounts(self.elo.default_player_count);
        let headcount = |unit: &str| match target_week {
            Some(week) => headcounts.for_week(unit, week),
            None => headcounts.typical(unit),
        };
        let strength_a = team_strength(
            &query.team_a,
            &ratings.ratings,
            ratings.initial_rating,
            headcount,
        );
        let strength_b = team_strength(
            &query.team_b,
            &ratings.ratings,
            ratings.initial_rating,
            headcount,
        );
        let mut elo = logistic_expectation(strength_a.average_rating, strength_b.average_rating);
        if let Some(info) = map_info {
            let attacker = info.attacker.side(query.flipped);
            elo = apply_map_bias(elo, attacker, info.bias, &self.elo.bias);
        }

        let (global_map, unit_map) = match &query.map {
            Some(map) => {
                let stats = MapStatistics::from_weeks(prior);
                (
                    self.global_map_factor(&stats, map, query.flipped),
                    self.unit_map_factor(&stats, map, &query.team_a, &query.team_b),
                )
            }
            None => (None, None),
        };

        let factors = ProbabilityFactors {
            elo,
            global_map,
            unit_map,
        };
        let prob_a = clamp_probability(self.fuse(&factors));
        debug!(
            "Estimated A {:.3} (elo {:.3}, map {:?}, units {:?})",
            prob_a, elo, global_map, unit_map
        );

        Ok(WinProbability {
            prob_a,
            prob_b: 1.0 - prob_a,
            factors,
        })
    }

    /// Season win rate of side A's faction on `map`, shrunk toward 0.5
    fn global_map_factor(&self, stats: &MapStatistics, map: &str, flipped: bool) -> Option<f64> {
        let record = stats.map(map);
        if record.plays == 0 {
            return None;
        }
        let faction_a = if flipped {
            Faction::Confederate
        } else {
            Faction::Union
        };
        let rate = record.wins_for(faction_a) as f64 / record.plays as f64;
        let confidence = record.plays as f64 / self.weights.map_full_confidence_plays as f64;
        Some(shrink_toward_neutral(rate, confidence))
    }

    /// Both teams' own map records as a probability for side A. Each team's
    /// shrunk rate contributes its deviation from 0.5.
    fn unit_map_factor(
        &self,
        stats: &MapStatistics,
        map: &str,
        team_a: &[UnitId],
        team_b: &[UnitId],
    ) -> Option<f64> {
        let deviation = |team: &[UnitId]| -> Option<f64> {
            let record = stats.team_on_map(team, map);
            let rate = record.rate()?;
            let full_confidence = (team.len() as u32 * self.weights.unit_map_games_per_member).max(1);
            let confidence = record.games as f64 / full_confidence as f64;
            Some(shrink_toward_neutral(rate, confidence) - 0.5)
        };

        let p = match (deviation(team_a), deviation(team_b)) {
            (Some(a), Some(b)) => 0.5 + (a - b) / 2.0,
            (Some(a), None) => 0.5 + a,
            (None, Some(b)) => 0.5 - b,
            (None, None) => return None,
        };
        Some(p.clamp(0.01, 0.99))
    }

    /// Weighted log-odds mean of the factors that have data
    fn fuse(&self, factors: &ProbabilityFactors) -> f64 {
        let parts = [
            (Some(factors.elo), self.weights.elo),
            (factors.global_map, self.weights.global_map),
            (factors.unit_map, self.weights.unit_map),
        ];

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (p, weight) in parts {
            if let Some(p) = p {
                if weight > 0.0 {
                    weighted += logit(p) * weight;
                    total_weight += weight;
                }
            }
        }

        if total_weight <= 0.0 {
            return 0.5;
        }
        inverse_logit(weighted / total_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Round, RoundResult, Side, Unit, Week};

    fn names(units: &[&str]) -> Vec<UnitId> {
        units.iter().map(|u| u.to_string()).collect()
    }

    fn estimator() -> WinProbabilityEstimator {
        WinProbabilityEstimator::new(EloSettings::default(), ProbabilityWeights::default())
            .unwrap()
    }

    fn season_with_history(rounds: &[(Side, &str, bool)]) -> Season {
        let mut season = Season::default();
        for unit in ["a", "b", "c", "d"] {
            season.add_unit(Unit::new(unit)).unwrap();
        }
        for (winner, map, flipped) in rounds {
            let week = Week::new("Week", season.maps.snapshot())
                .with_teams(names(&["a", "b"]), names(&["c", "d"]))
                .unwrap()
                .with_round(
                    Round::First,
                    RoundResult {
                        winner: Some(*winner),
                        map: Some(map.to_string()),
                        flipped: *flipped,
                    },
                );
            season.push_week(week).unwrap();
        }
        season
    }

    fn query(map: Option<&str>, before_week: usize) -> MatchupQuery {
        MatchupQuery {
            team_a: names(&["a", "b"]),
            team_b: names(&["c", "d"]),
            map: map.map(str::to_string),
            flipped: false,
            before_week,
        }
    }

    #[test]
    fn test_no_history_is_even() {
        let season = season_with_history(&[]);
        let result = estimator().estimate(&season, &query(None, 0)).unwrap();
        assert!((result.prob_a - 0.5).abs() < 1e-12);
        assert_eq!(result.percent_a(), 50);
        assert_eq!(result.percent_b(), 50);
        assert_eq!(result.factors.global_map, None);
        assert_eq!(result.factors.unit_map, None);
    }

    #[test]
    fn test_map_without_history_uses_only_elo() {
        let season = season_with_history(&[]);
        let result = estimator()
            .estimate(&season, &query(Some("Bloody Lane"), 0))
            .unwrap();
        // Heavy attacker map, A plays the attacking Union
        assert!((result.factors.elo - 0.65).abs() < 1e-12);
        assert!((result.prob_a - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_only_prior_weeks_are_used() {
        let season = season_with_history(&[(Side::A, "Miller's Cornfield", false); 3]);
        let before_any = estimator().estimate(&season, &query(None, 0)).unwrap();
        let after_all = estimator().estimate(&season, &query(None, 3)).unwrap();

        assert!((before_any.prob_a - 0.5).abs() < 1e-12);
        assert!(after_all.prob_a > 0.5);
    }

    #[test]
    fn test_map_factors_follow_history() {
        let season = season_with_history(&[(Side::A, "Miller's Cornfield", false); 5]);
        let result = estimator()
            .estimate(&season, &query(Some("Miller's Cornfield"), 5))
            .unwrap();

        // Union won all 5 plays: 0.5 + 0.5 * 5/10
        assert!((result.factors.global_map.unwrap() - 0.75).abs() < 1e-12);
        // A: 10 wins of 10 games over 2 units -> full confidence; B: 0 of 10
        assert!((result.factors.unit_map.unwrap() - 0.99).abs() < 1e-12);
        assert!(result.prob_a <= 0.95);
        assert!((result.prob_a + result.prob_b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flip_mirrors_global_factor() {
        let season = season_with_history(&[(Side::A, "Miller's Cornfield", false); 5]);
        let mut flipped = query(Some("Miller's Cornfield"), 5);
        flipped.flipped = true;
        let result = estimator().estimate(&season, &flipped).unwrap();
        assert!((result.factors.global_map.unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_probability_is_clamped() {
        let season = season_with_history(&[(Side::A, "Miller's Cornfield", false); 12]);
        let result = estimator()
            .estimate(&season, &query(Some("Miller's Cornfield"), 12))
            .unwrap();
        assert_eq!(result.prob_a, 0.95);
        assert!((result.prob_b - 0.05).abs() < 1e-12);
        assert_eq!(result.percent_a() + result.percent_b(), 100);
    }
}
