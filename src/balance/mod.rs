//! Team balancing
//!
//! This module handles splitting a week's available units into two sides:
//! partition enumeration, per-partition metrics and the balancer that picks
//! the lowest composite score.

pub mod balancer;
pub mod scoring;
pub mod search;

// Re-export commonly used types
pub use balancer::{BalanceOutcome, BalancePreview, BalanceRequest, TeamBalancer, TeamSplit};
pub use scoring::{PartitionMetrics, TeamRange, TeammatePenalty};
pub use search::{ExhaustiveSearch, PartitionSearch};
