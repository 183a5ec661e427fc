//! Rating system: weighted Elo folded over a week history
//!
//! This module provides the calculator interface, the population-weighted
//! Elo implementation built on the skillratings logistic, and metrics for
//! judging how well a configuration predicts results.

pub mod calculator;
pub mod elo;
pub mod evaluation;
pub mod expectation;

// Re-export commonly used types
pub use calculator::{RatingCalculator, RatingHistory, RatingState, RoundPrediction};
pub use elo::WeightedEloCalculator;
pub use evaluation::PredictionMetrics;
pub use expectation::{apply_map_bias, logistic_expectation, team_strength, TeamStrength};
