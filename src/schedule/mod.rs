//! Schedule generation
//!
//! Lead matchups are built to satisfy per-unit and in-division lead-night
//! quotas, then packed into weeks with the remaining units spread by
//! teammate history. Randomness is always supplied by the caller.

pub mod matchups;
pub mod simulator;

// Re-export commonly used types
pub use matchups::{LeadPlan, Matchup, MatchupGenerator};
pub use simulator::{
    Schedule, ScheduleMode, ScheduleOutcome, ScheduleRequest, ScheduleSimulator,
};
