//! Configuration management for the season engines
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for every engine.

pub mod app;
pub mod matchmaking;
pub mod points;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use matchmaking::{BalanceWeights, BalancerSettings, ScheduleSettings};
pub use points::PointSystem;
pub use rating::{BiasPercentages, EloSettings, ProbabilityWeights};
