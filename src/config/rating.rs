//! Rating and win-probability configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeasonError};
use crate::types::BiasLevel;

/// Percentage adjustment applied to the attacker's expectation per bias level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasPercentages {
    pub light_attacker: f64,
    pub heavy_attacker: f64,
    pub light_defender: f64,
    pub heavy_defender: f64,
}

impl Default for BiasPercentages {
    fn default() -> Self {
        Self {
            light_attacker: 15.0,
            heavy_attacker: 30.0,
            light_defender: 15.0,
            heavy_defender: 30.0,
        }
    }
}

impl BiasPercentages {
    /// Multiplier applied to the attacking side's expected score
    pub fn multiplier(&self, level: BiasLevel) -> f64 {
        match level {
            BiasLevel::Balanced => 1.0,
            BiasLevel::LightAttacker => 1.0 + self.light_attacker / 100.0,
            BiasLevel::HeavyAttacker => 1.0 + self.heavy_attacker / 100.0,
            BiasLevel::LightDefender => 1.0 - self.light_defender / 100.0,
            BiasLevel::HeavyDefender => 1.0 - self.heavy_defender / 100.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("light_attacker", self.light_attacker),
            ("heavy_attacker", self.heavy_attacker),
            ("light_defender", self.light_defender),
            ("heavy_defender", self.heavy_defender),
        ] {
            if !(0.0..100.0).contains(&pct) {
                return Err(SeasonError::ConfigurationError {
                    message: format!("Bias percentage {} must be in [0, 100), got {}", name, pct),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Parameters of the weighted Elo fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloSettings {
    pub initial_rating: f64,
    pub k_standard: f64,
    pub k_provisional: f64,
    /// Rounds played before a unit leaves the provisional K-factor
    pub provisional_rounds: u32,
    pub sweep_bonus_multiplier: f64,
    pub lead_multiplier: f64,
    /// Exponent on `ln(1 + players)` when splitting a team's delta
    pub size_influence: f64,
    pub playoff_multiplier: f64,
    /// Headcount used when neither the week nor the roster records one
    pub default_player_count: f64,
    pub bias: BiasPercentages,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            k_standard: 96.0,
            k_provisional: 128.0,
            provisional_rounds: 10,
            sweep_bonus_multiplier: 1.25,
            lead_multiplier: 2.0,
            size_influence: 1.0,
            playoff_multiplier: 1.25,
            default_player_count: 25.0,
            bias: BiasPercentages::default(),
        }
    }
}

impl EloSettings {
    /// Slower-moving ratings for long seasons
    pub fn conservative() -> Self {
        Self {
            k_standard: 64.0,
            k_provisional: 96.0,
            sweep_bonus_multiplier: 1.1,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.initial_rating <= 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "Initial rating must be positive".to_string(),
            }
            .into());
        }

        if self.k_standard < 0.0 || self.k_provisional < 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "K-factors must be non-negative".to_string(),
            }
            .into());
        }

        for (name, value) in [
            ("sweep_bonus_multiplier", self.sweep_bonus_multiplier),
            ("lead_multiplier", self.lead_multiplier),
            ("playoff_multiplier", self.playoff_multiplier),
        ] {
            if value <= 0.0 {
                return Err(SeasonError::ConfigurationError {
                    message: format!("{} must be positive", name),
                }
                .into());
            }
        }

        if self.size_influence < 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "Size influence must be non-negative".to_string(),
            }
            .into());
        }

        if self.default_player_count < 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "Default player count must be non-negative".to_string(),
            }
            .into());
        }

        self.bias.validate()
    }
}

/// Log-odds weights of the three win-probability factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityWeights {
    pub elo: f64,
    pub global_map: f64,
    pub unit_map: f64,
    /// Plays on a map at which its global win rate is taken at face value
    pub map_full_confidence_plays: u32,
    /// Games per team member at which a team's map record is taken at face value
    pub unit_map_games_per_member: u32,
}

impl Default for ProbabilityWeights {
    fn default() -> Self {
        Self {
            elo: 1.0,
            global_map: 0.4,
            unit_map: 0.35,
            map_full_confidence_plays: 10,
            unit_map_games_per_member: 3,
        }
    }
}

impl ProbabilityWeights {
    pub fn validate(&self) -> Result<()> {
        if self.elo < 0.0 || self.global_map < 0.0 || self.unit_map < 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "Probability weights must be non-negative".to_string(),
            }
            .into());
        }
        if self.elo + self.global_map + self.unit_map <= 0.0 {
            return Err(SeasonError::ConfigurationError {
                message: "At least one probability weight must be positive".to_string(),
            }
            .into());
        }
        if self.map_full_confidence_plays == 0 || self.unit_map_games_per_member == 0 {
            return Err(SeasonError::ConfigurationError {
                message: "Confidence sample sizes must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
