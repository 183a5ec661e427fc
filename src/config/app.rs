//! Main application configuration
//!
//! This module defines the top-level configuration for the season engines,
//! including environment variable and TOML file loading and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use super::matchmaking::{BalancerSettings, ScheduleSettings};
use super::points::PointSystem;
use super::rating::{EloSettings, ProbabilityWeights};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub elo: EloSettings,
    pub probability: ProbabilityWeights,
    pub balancer: BalancerSettings,
    pub schedule: ScheduleSettings,
    pub points: PointSystem,
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "season-balance".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {} value: {}", key, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Some(v) = parse_env("ELO_INITIAL_RATING")? {
            self.elo.initial_rating = v;
        }
        if let Some(v) = parse_env("ELO_K_STANDARD")? {
            self.elo.k_standard = v;
        }
        if let Some(v) = parse_env("ELO_K_PROVISIONAL")? {
            self.elo.k_provisional = v;
        }
        if let Some(v) = parse_env("ELO_PROVISIONAL_ROUNDS")? {
            self.elo.provisional_rounds = v;
        }
        if let Some(v) = parse_env("ELO_DEFAULT_PLAYER_COUNT")? {
            self.elo.default_player_count = v;
        }

        // Balancer and schedule settings
        if let Some(v) = parse_env("BALANCER_MAX_PLAYER_DIFF")? {
            self.balancer.max_player_diff = Some(v);
        }
        if let Some(v) = parse_env("SCHEDULE_MAX_ATTEMPTS")? {
            self.schedule.max_attempts = v;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.elo.validate()?;
    config.probability.validate()?;
    config.balancer.validate()?;
    config.schedule.validate()?;

    Ok(())
}
