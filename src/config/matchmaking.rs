//! Team balancer and schedule generator configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeasonError};

/// Weights of the composite partition score (lower score wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceWeights {
    pub gap: f64,
    pub min_diff: f64,
    pub teammate: f64,
    pub avg_diff: f64,
    /// 0 disables division splitting
    pub division_opposition: f64,
}

impl Default for BalanceWeights {
    fn default() -> Self {
        Self {
            gap: 100.0,
            min_diff: 10.0,
            teammate: 1.0,
            avg_diff: 0.5,
            division_opposition: 0.0,
        }
    }
}

/// Team balancer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerSettings {
    /// Maximum accepted range gap / minimum difference; `None` accepts any split
    pub max_player_diff: Option<u32>,
    /// Multiplier on pair counts above the season's rounded average
    pub over_teaming_penalty: f64,
    /// Warn before enumerating more free units than this
    pub roster_warning_size: usize,
    pub weights: BalanceWeights,
}

impl Default for BalancerSettings {
    fn default() -> Self {
        Self {
            max_player_diff: Some(1),
            over_teaming_penalty: 10.0,
            roster_warning_size: 20,
            weights: BalanceWeights::default(),
        }
    }
}

impl BalancerSettings {
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        if [w.gap, w.min_diff, w.teammate, w.avg_diff, w.division_opposition]
            .iter()
            .any(|v| *v < 0.0 || !v.is_finite())
        {
            return Err(SeasonError::ConfigurationError {
                message: "Balance weights must be finite and non-negative".to_string(),
            }
            .into());
        }
        if self.over_teaming_penalty < 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "Over-teaming penalty must be non-negative".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Schedule generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Restarts with a fresh unit order before settling for a partial schedule
    pub max_attempts: u32,
    pub lead_nights_per_unit: u32,
    pub lead_nights_in_division: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            lead_nights_per_unit: 1,
            lead_nights_in_division: 0,
        }
    }
}

impl ScheduleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SeasonError::ConfigurationError {
                message: "Schedule attempts must be greater than 0".to_string(),
            }
            .into());
        }
        if self.lead_nights_in_division > self.lead_nights_per_unit {
            return Err(SeasonError::ConfigurationError {
                message: "In-division lead nights cannot exceed lead nights per unit".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(BalancerSettings::default().validate().is_ok());
        assert!(ScheduleSettings::default().validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut settings = BalancerSettings::default();
        settings.weights.teammate = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_division_quota_bounded_by_lead_nights() {
        let settings = ScheduleSettings {
            lead_nights_per_unit: 1,
            lead_nights_in_division: 2,
            ..ScheduleSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
