//! Lead matchup generation
//!
//! Greedily pairs lead units so every unit reaches its lead-night quota,
//! honouring the in-division quota before any cross-division matchup.
//! Several randomized attempts are made and the one that fills the most
//! quotas is kept.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use crate::types::{DivisionMap, UnitId};

/// Two units leading against each other: `a` leads side A, `b` side B
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub a: UnitId,
    pub b: UnitId,
}

impl Matchup {
    pub fn new(a: impl Into<UnitId>, b: impl Into<UnitId>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn swapped(&self) -> Self {
        Self {
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }

    fn key(&self) -> (UnitId, UnitId) {
        if self.a <= self.b {
            (self.a.clone(), self.b.clone())
        } else {
            (self.b.clone(), self.a.clone())
        }
    }
}

/// Matchups of the best attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadPlan {
    pub matchups: Vec<Matchup>,
    pub lead_counts: BTreeMap<UnitId, u32>,
    /// Units left below their lead-night quota, sorted
    pub under_quota: Vec<UnitId>,
}

impl LeadPlan {
    pub fn is_complete(&self) -> bool {
        self.under_quota.is_empty()
    }
}

/// Quota-driven matchup search over a fixed unit list
#[derive(Debug, Clone)]
pub struct MatchupGenerator<'a> {
    units: &'a [UnitId],
    divisions: &'a DivisionMap,
    per_unit: u32,
    in_division: u32,
}

impl<'a> MatchupGenerator<'a> {
    pub fn new(units: &'a [UnitId], divisions: &'a DivisionMap, per_unit: u32, in_division: u32) -> Self {
        Self {
            units,
            divisions,
            per_unit,
            in_division,
        }
    }

    /// Run up to `max_attempts` attempts, stopping at the first complete one
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, max_attempts: u32) -> LeadPlan {
        let mut best: Option<LeadPlan> = None;

        for attempt in 1..=max_attempts.max(1) {
            let plan = self.attempt(rng);
            debug!(
                "Matchup attempt {}: {} matchups, {} units under quota",
                attempt,
                plan.matchups.len(),
                plan.under_quota.len()
            );

            let better = best
                .as_ref()
                .map(|b| plan.under_quota.len() < b.under_quota.len())
                .unwrap_or(true);
            if better {
                let complete = plan.is_complete();
                best = Some(plan);
                if complete {
                    break;
                }
            }
        }

        best.unwrap_or_default()
    }

    fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> LeadPlan {
        let mut order: Vec<UnitId> = self.units.to_vec();
        order.shuffle(rng);

        let mut state = AttemptState {
            leads: order.iter().map(|u| (u.clone(), 0)).collect(),
            in_division: order.iter().map(|u| (u.clone(), 0)).collect(),
            repeats: BTreeMap::new(),
        };
        let mut stuck: BTreeSet<UnitId> = BTreeSet::new();
        let mut matchups = Vec::new();

        loop {
            let next = order
                .iter()
                .filter(|u| state.leads(u) < self.per_unit && !stuck.contains(*u))
                .min_by_key(|u| state.leads(u));
            let Some(unit) = next else {
                break;
            };

            match self.pick_opponent(unit, &order, &state) {
                Some(opponent) => {
                    let matchup = Matchup::new(unit.clone(), opponent.clone());
                    trace!("Lead matchup {} vs {}", matchup.a, matchup.b);
                    state.record(&matchup, self.same_division(&matchup.a, &matchup.b));
                    matchups.push(matchup);
                }
                None => {
                    trace!("No opponent left for {}", unit);
                    stuck.insert(unit.clone());
                }
            }
        }

        let mut under_quota: Vec<UnitId> = order
            .iter()
            .filter(|u| state.leads(u) < self.per_unit)
            .cloned()
            .collect();
        under_quota.sort();

        LeadPlan {
            matchups,
            lead_counts: state.leads,
            under_quota,
        }
    }

    /// Fresh opponents first, repeated ones only when no fresh one fits.
    /// Within a pool: same-division while the in-division quota is open,
    /// then fewest leads, then fewest repeats.
    fn pick_opponent<'o>(&self, unit: &str, order: &'o [UnitId], state: &AttemptState) -> Option<&'o UnitId> {
        let candidates: Vec<&UnitId> = order
            .iter()
            .filter(|o| o.as_str() != unit)
            .filter(|o| state.leads(o) < self.per_unit)
            .filter(|o| self.division_allows(unit, o, state))
            .collect();

        let prefer_division = !self.division_satisfied(unit, state);
        let rank = |o: &&UnitId| {
            let same = self.same_division(unit, o);
            let prefer_division = prefer_division || !self.division_satisfied(o, state);
            (
                prefer_division && !same,
                state.leads(o),
                state.repeat_count(unit, o),
            )
        };

        let fresh = candidates
            .iter()
            .filter(|o| state.repeat_count(unit, o) == 0)
            .min_by_key(|o| rank(o));
        if let Some(opponent) = fresh {
            return Some(*opponent);
        }
        candidates.iter().min_by_key(|o| rank(o)).copied()
    }

    fn same_division(&self, a: &str, b: &str) -> bool {
        match (self.divisions.get(a), self.divisions.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Same-division matchups are always allowed; cross-division ones only
    /// once both units have met their in-division quota
    fn division_allows(&self, a: &str, b: &str, state: &AttemptState) -> bool {
        self.same_division(a, b)
            || (self.division_satisfied(a, state) && self.division_satisfied(b, state))
    }

    /// No division, no quota, no division peers, or quota met
    fn division_satisfied(&self, unit: &str, state: &AttemptState) -> bool {
        if self.in_division == 0 {
            return true;
        }
        let Some(division) = self.divisions.get(unit) else {
            return true;
        };
        let has_peers = self
            .units
            .iter()
            .any(|u| u != unit && self.divisions.get(u) == Some(division));
        !has_peers || state.in_division_count(unit) >= self.in_division
    }
}

struct AttemptState {
    leads: BTreeMap<UnitId, u32>,
    in_division: BTreeMap<UnitId, u32>,
    repeats: BTreeMap<(UnitId, UnitId), u32>,
}

impl AttemptState {
    fn leads(&self, unit: &str) -> u32 {
        self.leads.get(unit).copied().unwrap_or(0)
    }

    fn in_division_count(&self, unit: &str) -> u32 {
        self.in_division.get(unit).copied().unwrap_or(0)
    }

    fn repeat_count(&self, a: &str, b: &str) -> u32 {
        self.repeats
            .get(&Matchup::new(a, b).key())
            .copied()
            .unwrap_or(0)
    }

    fn record(&mut self, matchup: &Matchup, same_division: bool) {
        for unit in [&matchup.a, &matchup.b] {
            *self.leads.entry(unit.clone()).or_insert(0) += 1;
            if same_division {
                *self.in_division.entry(unit.clone()).or_insert(0) += 1;
            }
        }
        *self.repeats.entry(matchup.key()).or_insert(0) += 1;
    }
}
