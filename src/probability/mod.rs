//! Win-probability estimation
//!
//! Map outcome aggregation over a history prefix and the log-odds fusion of
//! rating, global-map and unit-map estimates.

pub mod estimator;
pub mod map_stats;

// Re-export commonly used types
pub use estimator::{MatchupQuery, ProbabilityFactors, WinProbability, WinProbabilityEstimator};
pub use map_stats::{AttackDefenseRecord, MapRecord, MapStatistics, WinLoss};
