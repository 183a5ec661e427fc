//! Rating calculator trait and the state it produces
//!
//! A calculator is a pure fold: the same roster, history prefix and
//! configuration always produce the same [`RatingState`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::types::{Round, Unit, UnitId, Week};

/// Per-unit rating and rounds played after folding a history prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    pub initial_rating: f64,
    pub ratings: BTreeMap<UnitId, f64>,
    pub rounds_played: BTreeMap<UnitId, u32>,
}

impl RatingState {
    /// Every unit in `units` starts at `initial_rating` with no rounds played
    pub fn new<I>(units: I, initial_rating: f64) -> Self
    where
        I: IntoIterator<Item = UnitId>,
    {
        let mut state = Self {
            initial_rating,
            ratings: BTreeMap::new(),
            rounds_played: BTreeMap::new(),
        };
        for unit in units {
            state.ensure(&unit);
        }
        state
    }

    /// Register a unit first seen in a week roster
    pub fn ensure(&mut self, unit: &str) {
        if !self.ratings.contains_key(unit) {
            self.ratings.insert(unit.to_string(), self.initial_rating);
            self.rounds_played.insert(unit.to_string(), 0);
        }
    }

    /// Rating of `unit`; unknown units sit at the initial rating
    pub fn rating(&self, unit: &str) -> f64 {
        self.ratings.get(unit).copied().unwrap_or(self.initial_rating)
    }

    pub fn rounds(&self, unit: &str) -> u32 {
        self.rounds_played.get(unit).copied().unwrap_or(0)
    }

    /// Units ordered by rating, highest first
    pub fn ranked(&self) -> Vec<(UnitId, f64)> {
        let mut ranked: Vec<(UnitId, f64)> =
            self.ratings.iter().map(|(u, r)| (u.clone(), *r)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

/// Expected and actual score of side A for one rated round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundPrediction {
    pub week_index: usize,
    pub round: Round,
    pub expected_a: f64,
    pub actual_a: f64,
}

/// Trace of a fold: ratings before the first week and after every week,
/// plus the prediction made for each rated round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingHistory {
    pub snapshots: Vec<BTreeMap<UnitId, f64>>,
    pub predictions: Vec<RoundPrediction>,
}

impl RatingHistory {
    /// Ratings after week `index` (0-based)
    pub fn after_week(&self, index: usize) -> Option<&BTreeMap<UnitId, f64>> {
        self.snapshots.get(index + 1)
    }

    /// Rating changes produced by week `index`
    pub fn week_deltas(&self, index: usize) -> BTreeMap<UnitId, f64> {
        match (self.snapshots.get(index), self.snapshots.get(index + 1)) {
            (Some(before), Some(after)) => after
                .iter()
                .map(|(unit, rating)| {
                    let previous = before.get(unit).copied().unwrap_or(*rating);
                    (unit.clone(), rating - previous)
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}

/// Trait for folding a week history into ratings
pub trait RatingCalculator: Send + Sync {
    /// Fold `history` (a season prefix) into per-unit ratings. Every unit in
    /// `roster` appears in the result even if it never played.
    fn compute_ratings(&self, roster: &[Unit], history: &[Week]) -> Result<RatingState> {
        self.compute_with_history(roster, history)
            .map(|(state, _)| state)
    }

    /// Same fold, also returning per-week snapshots and round predictions
    fn compute_with_history(
        &self,
        roster: &[Unit],
        history: &[Week],
    ) -> Result<(RatingState, RatingHistory)>;

    /// Rating every unit starts from
    fn initial_rating(&self) -> f64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from a (possibly partial) JSON object
    fn update_config(&mut self, config: serde_json::Value) -> Result<()>;
}
