//! Team balancer
//!
//! Splits the available units of a week into two sides whose headcount
//! ranges overlap, while spreading units that have often played together.
//! Units named in opposing pairs are pinned: the first unit of each pair to
//! side A, the second to side B.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::balance::scoring::{PartitionMetrics, TeamRange, TeammatePenalty};
use crate::balance::search::{ExhaustiveSearch, PartitionSearch};
use crate::config::BalancerSettings;
use crate::error::{Result, SeasonError};
use crate::season::TeammateHistory;
use crate::types::{DivisionMap, PlayerRange, UnitId};

/// Inputs of one balancing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Units not yet placed for the week
    pub available: Vec<UnitId>,
    /// Expected headcount per unit; a 0-0 range marks the unit absent
    pub counts: BTreeMap<UnitId, PlayerRange>,
    /// Pairs that must face each other
    #[serde(default)]
    pub opposing_pairs: Vec<(UnitId, UnitId)>,
    /// Largest accepted range gap and minimum difference; `None` accepts any split
    #[serde(default)]
    pub max_player_diff: Option<u32>,
}

impl BalanceRequest {
    pub fn new(available: Vec<UnitId>, counts: BTreeMap<UnitId, PlayerRange>) -> Self {
        Self {
            available,
            counts,
            opposing_pairs: Vec::new(),
            max_player_diff: None,
        }
    }

    pub fn with_opposing_pair(mut self, a: impl Into<UnitId>, b: impl Into<UnitId>) -> Self {
        self.opposing_pairs.push((a.into(), b.into()));
        self
    }

    pub fn with_max_player_diff(mut self, max_diff: Option<u32>) -> Self {
        self.max_player_diff = max_diff;
        self
    }
}

/// A chosen split with its measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSplit {
    pub team_a: Vec<UnitId>,
    pub team_b: Vec<UnitId>,
    pub metrics: PartitionMetrics,
    pub score: f64,
}

/// Result of a balancing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceOutcome {
    /// Best split is within the player-difference limit
    Balanced(TeamSplit),
    /// No split is within the limit; `best` is the lowest-scoring one
    Infeasible { best: TeamSplit, gap: u32, min_diff: u32 },
}

impl BalanceOutcome {
    pub fn split(&self) -> &TeamSplit {
        match self {
            BalanceOutcome::Balanced(split) => split,
            BalanceOutcome::Infeasible { best, .. } => best,
        }
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self, BalanceOutcome::Balanced(_))
    }
}

/// Measurements of a manually arranged split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePreview {
    pub range_a: TeamRange,
    pub range_b: TeamRange,
    pub gap: u32,
    pub min_diff: u32,
    pub avg_diff: f64,
    pub avg_history_a: f64,
    pub avg_history_b: f64,
    pub combined_avg_history: f64,
}

/// Team balancer over a pluggable partition search
pub struct TeamBalancer {
    settings: BalancerSettings,
    search: Box<dyn PartitionSearch>,
}

impl std::fmt::Debug for TeamBalancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamBalancer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TeamBalancer {
    /// Balancer using exhaustive enumeration
    pub fn new(settings: BalancerSettings) -> Result<Self> {
        Self::with_search(settings, Box::new(ExhaustiveSearch::new()))
    }

    pub fn with_search(settings: BalancerSettings, search: Box<dyn PartitionSearch>) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, search })
    }

    pub fn settings(&self) -> &BalancerSettings {
        &self.settings
    }

    /// Request pre-filled with the configured player-difference limit
    pub fn request(&self, available: Vec<UnitId>, counts: BTreeMap<UnitId, PlayerRange>) -> BalanceRequest {
        BalanceRequest::new(available, counts).with_max_player_diff(self.settings.max_player_diff)
    }

    /// Find the lowest-scoring split. A unit pinned to both sides is an
    /// error; a split outside the limit is reported as infeasible.
    pub fn balance(
        &self,
        request: &BalanceRequest,
        history: &TeammateHistory,
        divisions: &DivisionMap,
    ) -> Result<BalanceOutcome> {
        let (forced_a, forced_b) = pinned_sides(&request.opposing_pairs)?;

        let mut free: Vec<UnitId> = request
            .available
            .iter()
            .filter(|unit| {
                request
                    .counts
                    .get(*unit)
                    .map(|range| !range.is_absent())
                    .unwrap_or(false)
            })
            .filter(|unit| !forced_a.contains(unit) && !forced_b.contains(unit))
            .cloned()
            .collect();
        free.sort();
        free.dedup();

        if free.len() > self.settings.roster_warning_size {
            warn!(
                "Balancing {} free units: {} candidate splits",
                free.len(),
                self.search.candidate_count(free.len())
            );
        }

        let penalty = TeammatePenalty::new(history, self.settings.over_teaming_penalty);
        let weights = &self.settings.weights;
        let mut best: Option<TeamSplit> = None;
        let mut team_a: Vec<UnitId> = Vec::new();
        let mut team_b: Vec<UnitId> = Vec::new();
        let mut candidates = 0u64;

        self.search.for_each_partition(&free, &mut |extra_a, extra_b| {
            candidates += 1;
            team_a.clear();
            team_a.extend(forced_a.iter().cloned());
            team_a.extend(extra_a.iter().cloned());
            team_b.clear();
            team_b.extend(forced_b.iter().cloned());
            team_b.extend(extra_b.iter().cloned());

            let metrics =
                PartitionMetrics::measure(&team_a, &team_b, &request.counts, &penalty, divisions);
            let score = metrics.composite(weights);

            if best.as_ref().map(|b| score < b.score).unwrap_or(true) {
                best = Some(TeamSplit {
                    team_a: team_a.clone(),
                    team_b: team_b.clone(),
                    metrics,
                    score,
                });
            }
        });

        let best = best.ok_or(SeasonError::NoPartitions)?;
        debug!("Scored {} candidate splits", candidates);

        if best.metrics.within(request.max_player_diff) {
            info!(
                "Balanced {} vs {} units (A {}-{}, B {}-{}, score {:.1})",
                best.team_a.len(),
                best.team_b.len(),
                best.metrics.range_a.min,
                best.metrics.range_a.max,
                best.metrics.range_b.min,
                best.metrics.range_b.max,
                best.score
            );
            Ok(BalanceOutcome::Balanced(best))
        } else {
            let (gap, min_diff) = (best.metrics.gap, best.metrics.min_diff);
            warn!(
                "No split within {:?} players: best gap {}, min difference {}",
                request.max_player_diff, gap, min_diff
            );
            Ok(BalanceOutcome::Infeasible { best, gap, min_diff })
        }
    }

    /// Measure a split arranged by hand
    pub fn preview(
        &self,
        team_a: &[UnitId],
        team_b: &[UnitId],
        counts: &BTreeMap<UnitId, PlayerRange>,
        history: &TeammateHistory,
    ) -> BalancePreview {
        let range_a = TeamRange::of(team_a, counts);
        let range_b = TeamRange::of(team_b, counts);
        let avg_history_a = history.team_average(team_a);
        let avg_history_b = history.team_average(team_b);

        BalancePreview {
            range_a,
            range_b,
            gap: crate::balance::scoring::range_gap(range_a, range_b),
            min_diff: range_a.min.abs_diff(range_b.min),
            avg_diff: (range_a.midpoint() - range_b.midpoint()).abs(),
            avg_history_a,
            avg_history_b,
            combined_avg_history: (avg_history_a + avg_history_b) / 2.0,
        }
    }
}

/// Sides pinned by opposing pairs, in first-mention order
fn pinned_sides(pairs: &[(UnitId, UnitId)]) -> Result<(Vec<UnitId>, Vec<UnitId>)> {
    let mut forced_a: Vec<UnitId> = Vec::new();
    let mut forced_b: Vec<UnitId> = Vec::new();
    for (a, b) in pairs {
        if !forced_a.contains(a) {
            forced_a.push(a.clone());
        }
        if !forced_b.contains(b) {
            forced_b.push(b.clone());
        }
    }

    let mut conflicts: Vec<UnitId> = forced_a
        .iter()
        .filter(|unit| forced_b.contains(unit))
        .cloned()
        .collect();
    if !conflicts.is_empty() {
        conflicts.sort();
        return Err(SeasonError::ConflictingSides { units: conflicts }.into());
    }

    Ok((forced_a, forced_b))
}
