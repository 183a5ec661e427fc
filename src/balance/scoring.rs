//! Metrics and composite score of a candidate partition

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::BalanceWeights;
use crate::season::TeammateHistory;
use crate::types::{DivisionMap, PlayerRange, UnitId};

/// Summed headcount range of a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRange {
    pub min: u32,
    pub max: u32,
}

impl TeamRange {
    pub fn of(team: &[UnitId], counts: &BTreeMap<UnitId, PlayerRange>) -> Self {
        team.iter()
            .filter_map(|unit| counts.get(unit))
            .fold(TeamRange::default(), |acc, range| TeamRange {
                min: acc.min + range.min,
                max: acc.max + range.max,
            })
    }

    pub fn midpoint(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }
}

/// Non-overlap between two ranges, 0 when they overlap
pub fn range_gap(a: TeamRange, b: TeamRange) -> u32 {
    if a.max < b.min {
        b.min - a.max
    } else if b.max < a.min {
        a.min - b.max
    } else {
        0
    }
}

/// Teammate-history scoring with the over-teaming penalty. Pairs above the
/// season's rounded average pair count pay `multiplier` per extra week.
#[derive(Debug, Clone)]
pub struct TeammatePenalty<'a> {
    history: &'a TeammateHistory,
    threshold: u32,
    active: bool,
    multiplier: f64,
}

impl<'a> TeammatePenalty<'a> {
    pub fn new(history: &'a TeammateHistory, multiplier: f64) -> Self {
        let average = history.average_pair_count();
        Self {
            history,
            threshold: average.round() as u32,
            active: average > 0.0,
            multiplier,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Sum over same-team pairs of their teammate count plus penalty
    pub fn team_score(&self, team: &[UnitId]) -> f64 {
        let mut score = 0.0;
        for (i, a) in team.iter().enumerate() {
            for b in &team[i + 1..] {
                let count = self.history.count(a, b);
                score += count as f64;
                if self.active && count > self.threshold {
                    score += (count - self.threshold) as f64 * self.multiplier;
                }
            }
        }
        score
    }
}

/// Negative count of same-division pairs split across the two sides
pub fn division_opposition(team_a: &[UnitId], team_b: &[UnitId], divisions: &DivisionMap) -> f64 {
    let mut split = 0u32;
    for a in team_a {
        let Some(division_a) = divisions.get(a) else {
            continue;
        };
        split += team_b
            .iter()
            .filter(|b| divisions.get(*b) == Some(division_a))
            .count() as u32;
    }
    -(split as f64)
}

/// Everything the balancer measures about one partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetrics {
    pub range_a: TeamRange,
    pub range_b: TeamRange,
    pub gap: u32,
    pub min_diff: u32,
    pub avg_diff: f64,
    pub teammate_score: f64,
    pub division_opposition: f64,
}

impl PartitionMetrics {
    pub fn measure(
        team_a: &[UnitId],
        team_b: &[UnitId],
        counts: &BTreeMap<UnitId, PlayerRange>,
        penalty: &TeammatePenalty<'_>,
        divisions: &DivisionMap,
    ) -> Self {
        let range_a = TeamRange::of(team_a, counts);
        let range_b = TeamRange::of(team_b, counts);

        Self {
            range_a,
            range_b,
            gap: range_gap(range_a, range_b),
            min_diff: range_a.min.abs_diff(range_b.min),
            avg_diff: (range_a.midpoint() - range_b.midpoint()).abs(),
            teammate_score: penalty.team_score(team_a) + penalty.team_score(team_b),
            division_opposition: division_opposition(team_a, team_b, divisions),
        }
    }

    /// Weighted sum of the metrics; lower is better
    pub fn composite(&self, weights: &BalanceWeights) -> f64 {
        weights.gap * self.gap as f64
            + weights.min_diff * self.min_diff as f64
            + weights.teammate * self.teammate_score
            + weights.avg_diff * self.avg_diff
            + weights.division_opposition * self.division_opposition
    }

    /// Both the range gap and the minimum difference are within `max_diff`
    pub fn within(&self, max_diff: Option<u32>) -> bool {
        match max_diff {
            Some(limit) => self.gap <= limit && self.min_diff <= limit,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(names: &[&str]) -> Vec<UnitId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn counts(entries: &[(&str, u32, u32)]) -> BTreeMap<UnitId, PlayerRange> {
        entries
            .iter()
            .map(|(u, min, max)| (u.to_string(), PlayerRange::new(*min, *max)))
            .collect()
    }

    #[test]
    fn test_range_gap() {
        let low = TeamRange { min: 10, max: 20 };
        let high = TeamRange { min: 25, max: 30 };
        assert_eq!(range_gap(low, high), 5);
        assert_eq!(range_gap(high, low), 5);
        assert_eq!(range_gap(low, TeamRange { min: 15, max: 40 }), 0);
    }

    #[test]
    fn test_teammate_penalty_above_threshold() {
        let mut history = TeammateHistory::new();
        for _ in 0..5 {
            history.increment("a", "b");
        }
        history.increment("c", "d");
        // average (5 + 1) / 2 = 3
        let penalty = TeammatePenalty::new(&history, 10.0);
        assert_eq!(penalty.threshold(), 3);

        assert_eq!(penalty.team_score(&units(&["a", "b"])), 5.0 + 2.0 * 10.0);
        assert_eq!(penalty.team_score(&units(&["c", "d"])), 1.0);
        assert_eq!(penalty.team_score(&units(&["a", "c"])), 0.0);
    }

    #[test]
    fn test_empty_history_has_no_penalty() {
        let history = TeammateHistory::new();
        let penalty = TeammatePenalty::new(&history, 10.0);
        assert_eq!(penalty.team_score(&units(&["a", "b", "c"])), 0.0);
    }

    #[test]
    fn test_division_opposition_counts_split_pairs() {
        let mut divisions = DivisionMap::new();
        divisions.insert("a".to_string(), "East".to_string());
        divisions.insert("b".to_string(), "East".to_string());
        divisions.insert("c".to_string(), "West".to_string());

        assert_eq!(division_opposition(&units(&["a"]), &units(&["b", "c"]), &divisions), -1.0);
        assert_eq!(division_opposition(&units(&["a", "b"]), &units(&["c"]), &divisions), 0.0);
    }

    #[test]
    fn test_metrics_and_composite() {
        let counts = counts(&[("a", 10, 20), ("b", 8, 12), ("c", 20, 30)]);
        let history = TeammateHistory::new();
        let penalty = TeammatePenalty::new(&history, 10.0);
        let metrics = PartitionMetrics::measure(
            &units(&["a", "b"]),
            &units(&["c"]),
            &counts,
            &penalty,
            &DivisionMap::new(),
        );

        assert_eq!(metrics.range_a, TeamRange { min: 18, max: 32 });
        assert_eq!(metrics.gap, 0);
        assert_eq!(metrics.min_diff, 2);
        assert_eq!(metrics.avg_diff, 0.0);
        assert!(metrics.within(Some(2)));
        assert!(!metrics.within(Some(1)));
        assert!(metrics.within(None));
        assert_eq!(metrics.composite(&BalanceWeights::default()), 20.0);
    }
}
