//! Teammate and opponent history derived from the week sequence
//!
//! Pair counts are stored under an ordered key, so `count(a, b)` and
//! `count(b, a)` always read the same entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{UnitId, Week};

/// Symmetric (unit, unit) -> count mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairHistory {
    counts: BTreeMap<(UnitId, UnitId), u32>,
}

/// Weeks two units spent on the same side
pub type TeammateHistory = PairHistory;

/// Weeks two units spent on opposite sides
pub type OpponentHistory = PairHistory;

fn pair_key(a: &str, b: &str) -> (UnitId, UnitId) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl PairHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Teammate counts over a prefix of the season
    pub fn teammates(weeks: &[Week]) -> Self {
        let mut history = Self::new();
        for week in weeks {
            history.record_team(&week.team_a);
            history.record_team(&week.team_b);
        }
        history
    }

    /// Opponent counts over a prefix of the season
    pub fn opponents(weeks: &[Week]) -> Self {
        let mut history = Self::new();
        for week in weeks {
            history.record_opponents(&week.team_a, &week.team_b);
        }
        history
    }

    pub fn count(&self, a: &str, b: &str) -> u32 {
        if a == b {
            return 0;
        }
        self.counts.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        *self.counts.entry(pair_key(a, b)).or_insert(0) += 1;
    }

    /// Count one shared week for every pair in `team`
    pub fn record_team(&mut self, team: &[UnitId]) {
        for (i, a) in team.iter().enumerate() {
            for b in &team[i + 1..] {
                self.increment(a, b);
            }
        }
    }

    pub fn record_opponents(&mut self, team_a: &[UnitId], team_b: &[UnitId]) {
        for a in team_a {
            for b in team_b {
                self.increment(a, b);
            }
        }
    }

    /// Pairs with a non-zero count
    pub fn pairs(&self) -> impl Iterator<Item = (&UnitId, &UnitId, u32)> {
        self.counts.iter().map(|((a, b), c)| (a, b, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Mean count over pairs that have met at least once
    pub fn average_pair_count(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        let total: u64 = self.counts.values().map(|c| *c as u64).sum();
        total as f64 / self.counts.len() as f64
    }

    /// Sum of counts between `unit` and every member of `team`
    pub fn total_with(&self, unit: &str, team: &[UnitId]) -> u32 {
        team.iter().map(|other| self.count(unit, other)).sum()
    }

    /// Every unit `unit` has met, with counts
    pub fn partners(&self, unit: &str) -> BTreeMap<UnitId, u32> {
        self.counts
            .iter()
            .filter_map(|((a, b), c)| {
                if a == unit {
                    Some((b.clone(), *c))
                } else if b == unit {
                    Some((a.clone(), *c))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Mean pair count within `team` (0 for fewer than two units)
    pub fn team_average(&self, team: &[UnitId]) -> f64 {
        if team.len() < 2 {
            return 0.0;
        }
        let mut total = 0u64;
        let mut pairs = 0u64;
        for (i, a) in team.iter().enumerate() {
            for b in &team[i + 1..] {
                total += self.count(a, b) as u64;
                pairs += 1;
            }
        }
        total as f64 / pairs as f64
    }
}

/// 1-based week numbers in which a pair met
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairInteraction {
    pub teammate_weeks: Vec<usize>,
    pub opponent_weeks: Vec<usize>,
}

/// Per-pair week numbers as teammates and as opponents, keyed by ordered pair
pub fn detailed_interactions(weeks: &[Week]) -> BTreeMap<(UnitId, UnitId), PairInteraction> {
    let mut interactions: BTreeMap<(UnitId, UnitId), PairInteraction> = BTreeMap::new();

    for (idx, week) in weeks.iter().enumerate() {
        let week_number = idx + 1;
        for team in [&week.team_a, &week.team_b] {
            for (i, a) in team.iter().enumerate() {
                for b in &team[i + 1..] {
                    interactions
                        .entry(pair_key(a, b))
                        .or_default()
                        .teammate_weeks
                        .push(week_number);
                }
            }
        }
        for a in &week.team_a {
            for b in &week.team_b {
                interactions
                    .entry(pair_key(a, b))
                    .or_default()
                    .opponent_weeks
                    .push(week_number);
            }
        }
    }

    interactions
}
