//! Error types for the season engines
//!
//! Failures are carried as `anyhow::Error` throughout the crate; the typed
//! variants below can be recovered with `downcast_ref::<SeasonError>()` when a
//! caller needs to react to a specific condition.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific season scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeasonError {
    #[error("Units cannot be forced onto both teams: {}", units.join(", "))]
    ConflictingSides { units: Vec<String> },

    #[error("Unit not found: {unit}")]
    UnknownUnit { unit: String },

    #[error("Unit already exists: {unit}")]
    DuplicateUnit { unit: String },

    #[error("Week not found: {week}")]
    UnknownWeek { week: String },

    #[error("Division not found: {division}")]
    UnknownDivision { division: String },

    #[error("Partition search produced no candidates")]
    NoPartitions,

    #[error("Invalid week: {reason}")]
    InvalidWeek { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
