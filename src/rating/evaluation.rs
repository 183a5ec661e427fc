//! Prediction-quality metrics for tuning rating settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::rating::calculator::{RatingHistory, RoundPrediction};
use crate::types::UnitId;

/// How well a rating fold predicted the rounds it rated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetrics {
    pub rounds: usize,
    /// Mean squared error of expected vs. actual (lower is better)
    pub brier: f64,
    /// Share of rounds where the favourite won
    pub accuracy: f64,
    /// RMS of non-zero per-week rating changes
    pub volatility: f64,
    /// Mean absolute change of the roster-wide average rating per week
    pub drift: f64,
    /// Squared correlation between expected and actual
    pub r_squared: f64,
}

impl PredictionMetrics {
    pub fn evaluate(history: &RatingHistory) -> Self {
        Self {
            rounds: history.predictions.len(),
            brier: brier_score(&history.predictions),
            accuracy: accuracy(&history.predictions),
            volatility: volatility(history),
            drift: mean_abs_drift(history),
            r_squared: r_squared(&history.predictions),
        }
    }

    /// Single 0-100 figure where higher is better. Volatility is normalized
    /// against 100 rating points and drift against 10.
    pub fn composite(&self) -> f64 {
        let parts = [
            1.0 - self.brier,
            self.accuracy,
            1.0 - self.volatility / 100.0,
            1.0 - self.drift / 10.0,
            self.r_squared,
        ];
        parts.iter().sum::<f64>() / parts.len() as f64 * 100.0
    }
}

pub fn brier_score(predictions: &[RoundPrediction]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .map(|p| (p.expected_a - p.actual_a).powi(2))
        .sum::<f64>()
        / predictions.len() as f64
}

/// Even expectations count as misses
pub fn accuracy(predictions: &[RoundPrediction]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .filter(|p| {
            (p.expected_a > 0.5 && p.actual_a == 1.0) || (p.expected_a < 0.5 && p.actual_a == 0.0)
        })
        .count();
    correct as f64 / predictions.len() as f64
}

pub fn volatility(history: &RatingHistory) -> f64 {
    let Some(first) = history.snapshots.first() else {
        return 0.0;
    };
    let units: BTreeSet<&UnitId> = first.keys().collect();

    let mut total_squared = 0.0;
    let mut changes = 0usize;
    for pair in history.snapshots.windows(2) {
        for unit in &units {
            let before = pair[0].get(*unit).copied().unwrap_or(0.0);
            let after = pair[1].get(*unit).copied().unwrap_or(before);
            let change = after - before;
            if change.abs() > 1e-9 {
                total_squared += change * change;
                changes += 1;
            }
        }
    }

    if changes == 0 {
        0.0
    } else {
        (total_squared / changes as f64).sqrt()
    }
}

pub fn mean_abs_drift(history: &RatingHistory) -> f64 {
    if history.snapshots.len() < 2 {
        return 0.0;
    }
    let mean = |ratings: &std::collections::BTreeMap<UnitId, f64>| {
        if ratings.is_empty() {
            0.0
        } else {
            ratings.values().sum::<f64>() / ratings.len() as f64
        }
    };

    let drifts: Vec<f64> = history
        .snapshots
        .windows(2)
        .map(|pair| (mean(&pair[1]) - mean(&pair[0])).abs())
        .collect();
    drifts.iter().sum::<f64>() / drifts.len() as f64
}

/// 0 when either series has no variance
pub fn r_squared(predictions: &[RoundPrediction]) -> f64 {
    if predictions.len() < 2 {
        return 0.0;
    }
    let n = predictions.len() as f64;
    let mean_x = predictions.iter().map(|p| p.actual_a).sum::<f64>() / n;
    let mean_y = predictions.iter().map(|p| p.expected_a).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for p in predictions {
        let dx = p.actual_a - mean_x;
        let dy = p.expected_a - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    let correlation = covariance / (var_x.sqrt() * var_y.sqrt());
    correlation * correlation
}
