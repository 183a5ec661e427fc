//! Season Balance - ratings, win probabilities, team balancing and
//! schedule generation for unit-based leagues
//!
//! Every engine is a pure function of a [`Season`] prefix and its
//! configuration; randomness is injected by the caller.

pub mod balance;
pub mod config;
pub mod error;
pub mod maps;
pub mod probability;
pub mod rating;
pub mod schedule;
pub mod season;
pub mod standings;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SeasonError};
pub use types::*;

// Re-export key components
pub use balance::{BalanceOutcome, TeamBalancer};
pub use maps::MapCatalog;
pub use probability::{MatchupQuery, WinProbability, WinProbabilityEstimator};
pub use rating::{RatingCalculator, WeightedEloCalculator};
pub use schedule::{ScheduleOutcome, ScheduleRequest, ScheduleSimulator};
pub use season::{Season, TeammateHistory};
pub use standings::{Standings, StandingsOrder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
