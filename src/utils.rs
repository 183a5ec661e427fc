//! Utility functions shared by the season engines

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lower bound applied to any published probability
pub const MIN_PROBABILITY: f64 = 0.05;

/// Upper bound applied to any published probability
pub const MAX_PROBABILITY: f64 = 0.95;

/// Generate a new unique week ID
pub fn generate_week_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Clamp a probability into `[MIN_PROBABILITY, MAX_PROBABILITY]`
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

/// Log-odds of a probability. Inputs are kept away from 0 and 1 so the
/// result stays finite.
pub fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-6, 1.0 - 1e-6);
    (p / (1.0 - p)).ln()
}

/// Inverse of [`logit`]
pub fn inverse_logit(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Shrink an observed rate toward 0.5 by `confidence` (0.0 = neutral, 1.0 = raw rate)
pub fn shrink_toward_neutral(rate: f64, confidence: f64) -> f64 {
    0.5 + (rate - 0.5) * confidence.clamp(0.0, 1.0)
}

/// Midpoint of an integer player range
pub fn range_midpoint(min: u32, max: u32) -> f64 {
    (min as f64 + max as f64) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_week_id();
        let id2 = generate_week_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_logit_round_trip() {
        for p in [0.1, 0.25, 0.5, 0.8] {
            assert!((inverse_logit(logit(p)) - p).abs() < 1e-12);
        }
        assert_eq!(logit(0.5), 0.0);
    }

    #[test]
    fn test_logit_stays_finite_at_bounds() {
        assert!(logit(0.0).is_finite());
        assert!(logit(1.0).is_finite());
    }

    #[test]
    fn test_clamp_probability() {
        assert_eq!(clamp_probability(0.0), MIN_PROBABILITY);
        assert_eq!(clamp_probability(1.2), MAX_PROBABILITY);
        assert_eq!(clamp_probability(0.4), 0.4);
    }

    #[test]
    fn test_shrink_toward_neutral() {
        assert_eq!(shrink_toward_neutral(1.0, 0.0), 0.5);
        assert_eq!(shrink_toward_neutral(1.0, 1.0), 1.0);
        assert!((shrink_toward_neutral(0.8, 0.5) - 0.65).abs() < 1e-12);
        // Confidence above 1 is capped
        assert_eq!(shrink_toward_neutral(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_range_midpoint() {
        assert_eq!(range_midpoint(20, 30), 25.0);
        assert_eq!(range_midpoint(0, 0), 0.0);
    }
}
