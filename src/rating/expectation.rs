//! Team-level expectation shared by the rating fold and the win-probability
//! estimator

use skillratings::elo::{expected_score, EloRating};
use std::collections::BTreeMap;

use crate::config::BiasPercentages;
use crate::types::{BiasLevel, Side, UnitId};
use crate::utils::clamp_probability;

/// Headcount-weighted average rating of a team
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamStrength {
    pub average_rating: f64,
    pub total_players: f64,
}

/// Average `ratings` over `team`, weighting each unit by `headcount(unit)`.
/// Teams with no players fall back to `initial_rating`.
pub fn team_strength<F>(
    team: &[UnitId],
    ratings: &BTreeMap<UnitId, f64>,
    initial_rating: f64,
    headcount: F,
) -> TeamStrength
where
    F: Fn(&str) -> f64,
{
    let mut total_players = 0.0;
    let mut weighted = 0.0;
    for unit in team {
        let players = headcount(unit);
        let rating = ratings.get(unit).copied().unwrap_or(initial_rating);
        total_players += players;
        weighted += rating * players;
    }

    let average_rating = if total_players > 0.0 {
        weighted / total_players
    } else {
        initial_rating
    };

    TeamStrength {
        average_rating,
        total_players,
    }
}

/// Logistic expectation of side A beating side B: `1 / (1 + 10^((b - a) / 400))`
pub fn logistic_expectation(average_a: f64, average_b: f64) -> f64 {
    let (expected_a, _) = expected_score(
        &EloRating { rating: average_a },
        &EloRating { rating: average_b },
    );
    expected_a
}

/// Scale side A's expectation by the map bias: multiplied when A attacks,
/// divided when A defends, then clamped into the published bounds.
pub fn apply_map_bias(
    expected_a: f64,
    attacker: Side,
    level: BiasLevel,
    bias: &BiasPercentages,
) -> f64 {
    let multiplier = bias.multiplier(level);
    let adjusted = match attacker {
        Side::A => expected_a * multiplier,
        Side::B => expected_a / multiplier,
    };
    clamp_probability(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(pairs: &[(&str, f64)]) -> BTreeMap<UnitId, f64> {
        pairs.iter().map(|(u, r)| (u.to_string(), *r)).collect()
    }

    #[test]
    fn test_equal_ratings_are_even() {
        assert!((logistic_expectation(1500.0, 1500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_matches_formula() {
        let expected = 1.0 / (1.0 + 10f64.powf((1400.0 - 1600.0) / 400.0));
        assert!((logistic_expectation(1600.0, 1400.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_team_strength_weights_by_headcount() {
        let team = vec!["big".to_string(), "small".to_string()];
        let r = ratings(&[("big", 1600.0), ("small", 1300.0)]);
        let strength = team_strength(&team, &r, 1500.0, |u| if u == "big" { 30.0 } else { 10.0 });

        assert_eq!(strength.total_players, 40.0);
        assert!((strength.average_rating - (1600.0 * 30.0 + 1300.0 * 10.0) / 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_team_strength_without_players() {
        let team = vec!["ghost".to_string()];
        let strength = team_strength(&team, &BTreeMap::new(), 1500.0, |_| 0.0);
        assert_eq!(strength.average_rating, 1500.0);
        assert_eq!(strength.total_players, 0.0);
    }

    #[test]
    fn test_map_bias_direction_and_clamp() {
        let bias = BiasPercentages::default();
        let attacking = apply_map_bias(0.5, Side::A, BiasLevel::HeavyAttacker, &bias);
        assert!((attacking - 0.65).abs() < 1e-12);

        let defending = apply_map_bias(0.5, Side::B, BiasLevel::HeavyAttacker, &bias);
        assert!((defending - 0.5 / 1.3).abs() < 1e-12);

        assert_eq!(apply_map_bias(0.9, Side::A, BiasLevel::HeavyAttacker, &bias), 0.95);
        assert_eq!(apply_map_bias(0.5, Side::A, BiasLevel::Balanced, &bias), 0.5);
    }
}
