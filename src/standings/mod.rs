//! Derived season views
//!
//! Points, standings with week-over-week changes, division grouping and
//! lineup synergy. Map and attack/defence records live in
//! [`crate::probability::MapStatistics`].

pub mod points;
pub mod synergy;
pub mod table;

// Re-export commonly used types
pub use points::{points_table, UnitRecord};
pub use synergy::{LineupRecord, Synergy};
pub use table::{DivisionStandings, StandingEntry, Standings, StandingsOrder, UNASSIGNED_GROUP};
