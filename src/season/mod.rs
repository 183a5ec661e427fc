//! Season state and the histories derived from it
//!
//! This module holds the ordered week sequence with its explicit update
//! operations, plus the teammate/opponent aggregations every engine reads.

pub mod interactions;
pub mod roster;

// Re-export commonly used types
pub use interactions::{
    detailed_interactions, OpponentHistory, PairHistory, PairInteraction, TeammateHistory,
};
pub use roster::{Headcounts, Season};
