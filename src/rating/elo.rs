//! Population-weighted Elo over a week history
//!
//! Each rated round compares the two teams' headcount-weighted average
//! ratings, optionally skewed by the map's attack/defence bias, and spreads
//! the resulting change across each team by log-scaled headcount with a
//! bonus for the round's lead.

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::EloSettings;
use crate::error::Result;
use crate::rating::calculator::{RatingCalculator, RatingHistory, RatingState, RoundPrediction};
use crate::rating::expectation::{apply_map_bias, logistic_expectation, team_strength};
use crate::season::Headcounts;
use crate::types::{Round, Side, Unit, UnitId, Week};

/// Weighted Elo rating calculator
#[derive(Debug, Clone)]
pub struct WeightedEloCalculator {
    settings: EloSettings,
}

impl Default for WeightedEloCalculator {
    fn default() -> Self {
        Self {
            settings: EloSettings::default(),
        }
    }
}

impl WeightedEloCalculator {
    /// Create a calculator, rejecting invalid settings
    pub fn new(settings: EloSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EloSettings {
        &self.settings
    }

    fn headcounts(&self, roster: &[Unit]) -> Headcounts {
        Headcounts::new(
            roster
                .iter()
                .filter_map(|u| u.players.map(|p| (u.name.clone(), p)))
                .collect(),
            self.settings.default_player_count,
        )
    }

    fn apply_week(
        &self,
        state: &mut RatingState,
        trace_out: &mut RatingHistory,
        week_index: usize,
        week: &Week,
        headcounts: &Headcounts,
    ) {
        let settings = &self.settings;
        let sweep = week.sweep();
        let round_multiplier = if week.mode.is_playoffs() {
            settings.playoff_multiplier
        } else {
            1.0
        };
        let headcount = |unit: &str| headcounts.for_week(unit, week);

        for unit in week.participants() {
            state.ensure(unit);
        }

        for round in Round::ALL {
            let Some(winner) = week.winner(round) else {
                continue;
            };

            let strength_a = team_strength(
                &week.team_a,
                &state.ratings,
                settings.initial_rating,
                headcount,
            );
            let strength_b = team_strength(
                &week.team_b,
                &state.ratings,
                settings.initial_rating,
                headcount,
            );

            let mut expected_a =
                logistic_expectation(strength_a.average_rating, strength_b.average_rating);
            if let (Some(attacker), Some(level)) = (week.attacker(round), week.bias_level(round)) {
                expected_a = apply_map_bias(expected_a, attacker, level, &settings.bias);
            }

            let actual_a = if winner == Side::A { 1.0 } else { 0.0 };
            let base_change = actual_a - expected_a;
            trace!(
                "{} round {}: expected A {:.3}, winner {}",
                week.name,
                round.number(),
                expected_a,
                winner
            );
            trace_out.predictions.push(RoundPrediction {
                week_index,
                round,
                expected_a,
                actual_a,
            });

            for (side, strength) in [(Side::A, strength_a), (Side::B, strength_b)] {
                if strength.total_players <= 0.0 {
                    continue;
                }
                let sign = match side {
                    Side::A => 1.0,
                    Side::B => -1.0,
                };
                let sweep_bonus = if sweep == Some(side) {
                    settings.sweep_bonus_multiplier
                } else {
                    1.0
                };
                self.distribute(
                    state,
                    week.team(side),
                    week.mode.lead(round, side),
                    sign * base_change * round_multiplier * sweep_bonus,
                    headcount,
                );
            }

            for unit in week.participants() {
                *state.rounds_played.entry(unit.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Split `change` across `team` by normalized weight, scaled by each
    /// unit's own K-factor and its distance from the team average
    fn distribute<F>(
        &self,
        state: &mut RatingState,
        team: &[UnitId],
        lead: Option<&UnitId>,
        change: f64,
        headcount: F,
    ) where
        F: Fn(&str) -> f64,
    {
        let settings = &self.settings;
        let weights: Vec<f64> = team
            .iter()
            .map(|unit| {
                let weight = (1.0 + headcount(unit)).ln().powf(settings.size_influence);
                if lead == Some(unit) {
                    weight * settings.lead_multiplier
                } else {
                    weight
                }
            })
            .collect();
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 || team.is_empty() {
            return;
        }

        let team_average =
            team.iter().map(|u| state.rating(u)).sum::<f64>() / team.len() as f64;

        for (unit, weight) in team.iter().zip(weights) {
            let rating = state.rating(unit);
            let k = if state.rounds(unit) < settings.provisional_rounds {
                settings.k_provisional
            } else {
                settings.k_standard
            };
            let relative_factor = if rating > 0.0 {
                (team_average / rating).sqrt().clamp(0.8, 1.2)
            } else {
                1.0
            };

            let delta = k * change * (weight / total_weight) * relative_factor;
            state.ratings.insert(unit.clone(), rating + delta);
        }
    }
}

impl RatingCalculator for WeightedEloCalculator {
    fn compute_with_history(
        &self,
        roster: &[Unit],
        history: &[Week],
    ) -> Result<(RatingState, RatingHistory)> {
        let headcounts = self.headcounts(roster);
        let mut state = RatingState::new(
            roster.iter().map(|u| u.name.clone()),
            self.settings.initial_rating,
        );
        let mut trace_out = RatingHistory::default();
        trace_out.snapshots.push(state.ratings.clone());

        for (week_index, week) in history.iter().enumerate() {
            if week.has_both_rosters() {
                self.apply_week(&mut state, &mut trace_out, week_index, week, &headcounts);
            } else {
                debug!("Skipping {} for ratings: a side has no roster", week.name);
            }
            trace_out.snapshots.push(state.ratings.clone());
        }

        Ok((state, trace_out))
    }

    fn initial_rating(&self) -> f64 {
        self.settings.initial_rating
    }

    fn config(&self) -> Value {
        serde_json::to_value(&self.settings).unwrap_or(Value::Null)
    }

    fn update_config(&mut self, config: Value) -> Result<()> {
        let mut merged = serde_json::to_value(&self.settings)?;
        if let (Some(current), Some(patch)) = (merged.as_object_mut(), config.as_object()) {
            for (key, value) in patch {
                current.insert(key.clone(), value.clone());
            }
        }

        let settings: EloSettings = serde_json::from_value(merged)?;
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::MapCatalog;
    use crate::types::{RoundResult, SideLeads, WeekMode};

    fn names(units: &[&str]) -> Vec<UnitId> {
        units.iter().map(|u| u.to_string()).collect()
    }

    fn roster(units: &[&str]) -> Vec<Unit> {
        units.iter().map(|u| Unit::new(*u)).collect()
    }

    fn week(a: &[&str], b: &[&str], winners: [Option<Side>; 2]) -> Week {
        Week::new("Week", MapCatalog::war_of_rights().snapshot())
            .with_teams(names(a), names(b))
            .unwrap()
            .with_round(
                Round::First,
                RoundResult {
                    winner: winners[0],
                    ..RoundResult::default()
                },
            )
            .with_round(
                Round::Second,
                RoundResult {
                    winner: winners[1],
                    ..RoundResult::default()
                },
            )
    }

    #[test]
    fn test_single_round_concrete_case() {
        let calculator = WeightedEloCalculator::default();
        let history = vec![week(&["a"], &["b"], [Some(Side::A), None])];

        let state = calculator
            .compute_ratings(&roster(&["a", "b"]), &history)
            .unwrap();

        assert!((state.rating("a") - 1564.0).abs() < 1e-9);
        assert!((state.rating("b") - 1436.0).abs() < 1e-9);
        assert_eq!(state.rounds("a"), 1);
        assert_eq!(state.rounds("b"), 1);
    }

    #[test]
    fn test_week_without_roster_is_skipped() {
        let calculator = WeightedEloCalculator::default();
        let history = vec![week(&["a"], &[], [Some(Side::A), Some(Side::A)])];

        let (state, trace_out) = calculator
            .compute_with_history(&roster(&["a"]), &history)
            .unwrap();

        assert_eq!(state.rating("a"), 1500.0);
        assert_eq!(state.rounds("a"), 0);
        assert_eq!(trace_out.snapshots.len(), 2);
        assert!(trace_out.predictions.is_empty());
    }

    #[test]
    fn test_sweep_bonus_applies_to_winner_only() {
        let calculator = WeightedEloCalculator::default();
        let history = vec![week(&["a"], &["b"], [Some(Side::A), Some(Side::A)])];
        let state = calculator
            .compute_ratings(&roster(&["a", "b"]), &history)
            .unwrap();

        // Round 1: +-64 with the 1.25 sweep bonus for A only
        let a1 = 1500.0 + 128.0 * 0.5 * 1.25;
        let b1 = 1500.0 - 128.0 * 0.5;
        let expected_a2 = 1.0 / (1.0 + 10f64.powf((b1 - a1) / 400.0));
        let change = 1.0 - expected_a2;
        let a2 = a1 + 128.0 * change * 1.25;
        let b2 = b1 - 128.0 * change;

        assert!((state.rating("a") - a2).abs() < 1e-9);
        assert!((state.rating("b") - b2).abs() < 1e-9);
    }

    #[test]
    fn test_playoff_multiplier() {
        let calculator = WeightedEloCalculator::default();
        let history = vec![week(&["a"], &["b"], [Some(Side::B), None]).with_mode(
            WeekMode::Playoffs {
                rounds: [SideLeads::default(), SideLeads::default()],
            },
        )];
        let state = calculator
            .compute_ratings(&roster(&["a", "b"]), &history)
            .unwrap();

        assert!((state.rating("b") - (1500.0 + 64.0 * 1.25)).abs() < 1e-9);
    }

    #[test]
    fn test_lead_takes_larger_share() {
        let calculator = WeightedEloCalculator::default();
        let history = vec![week(&["lead", "assist"], &["b"], [Some(Side::A), None]).with_mode(
            WeekMode::Normal {
                leads: SideLeads::new(Some("lead".to_string()), None),
            },
        )];
        let state = calculator
            .compute_ratings(&roster(&["lead", "assist", "b"]), &history)
            .unwrap();

        let lead_gain = state.rating("lead") - 1500.0;
        let assist_gain = state.rating("assist") - 1500.0;
        assert!((lead_gain - 2.0 * assist_gain).abs() < 1e-9);
        assert!((lead_gain + assist_gain - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_bias_changes_expectation() {
        let calculator = WeightedEloCalculator::default();
        // Bloody Lane is a heavy-attacker Union attack; A plays the Union
        let history = vec![week(&["a"], &["b"], [None, None]).with_round(
            Round::First,
            RoundResult {
                winner: Some(Side::A),
                map: Some("Bloody Lane".to_string()),
                flipped: false,
            },
        )];

        let (_, trace_out) = calculator
            .compute_with_history(&roster(&["a", "b"]), &history)
            .unwrap();
        let bias = calculator.settings().bias.multiplier(
            history[0].bias_level(Round::First).unwrap_or_default(),
        );
        let expected = (0.5 * bias).clamp(0.05, 0.95);
        assert!((trace_out.predictions[0].expected_a - expected).abs() < 1e-12);
    }

    #[test]
    fn test_provisional_k_expires() {
        let settings = EloSettings {
            provisional_rounds: 1,
            ..EloSettings::default()
        };
        let calculator = WeightedEloCalculator::new(settings).unwrap();
        let history = vec![
            week(&["a"], &["b"], [Some(Side::A), None]),
            week(&["a"], &["b"], [Some(Side::B), None]),
        ];
        let state = calculator
            .compute_ratings(&roster(&["a", "b"]), &history)
            .unwrap();

        let expected_a = 1.0 / (1.0 + 10f64.powf((1436.0 - 1564.0) / 400.0));
        assert!((state.rating("a") - (1564.0 - 96.0 * expected_a)).abs() < 1e-9);
    }

    #[test]
    fn test_ratings_are_deterministic() {
        let calculator = WeightedEloCalculator::default();
        let history = vec![
            week(&["a", "b"], &["c"], [Some(Side::A), Some(Side::B)]),
            week(&["a"], &["b", "c"], [Some(Side::B), Some(Side::B)]),
        ];
        let units = roster(&["a", "b", "c"]);

        let first = calculator.compute_ratings(&units, &history).unwrap();
        let second = calculator.compute_ratings(&units, &history).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_config_merges_partial_object() {
        let mut calculator = WeightedEloCalculator::default();
        calculator
            .update_config(serde_json::json!({ "initial_rating": 1200.0 }))
            .unwrap();

        assert_eq!(calculator.initial_rating(), 1200.0);
        assert_eq!(calculator.settings().k_standard, 96.0);
        assert_eq!(calculator.config()["initial_rating"], 1200.0);

        assert!(calculator
            .update_config(serde_json::json!({ "k_standard": -5.0 }))
            .is_err());
        assert_eq!(calculator.settings().k_standard, 96.0);
    }
}
