//! Enumeration of candidate partitions
//!
//! The balancer scores whatever partitions a [`PartitionSearch`] yields, so
//! the brute-force enumeration can be swapped for a bounded or pruned one
//! without touching scoring.

use crate::types::UnitId;

/// Source of candidate splits of the free units
pub trait PartitionSearch: Send + Sync {
    /// Call `visit(side_a, side_b)` for each candidate split of `free`.
    /// Every unit lands on exactly one side.
    fn for_each_partition(&self, free: &[UnitId], visit: &mut dyn FnMut(&[UnitId], &[UnitId]));

    /// Number of candidates `for_each_partition` will visit for `free_units`
    fn candidate_count(&self, free_units: usize) -> u128;
}

/// Every subset size, every subset of that size, in lexicographic order
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSearch;

impl ExhaustiveSearch {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionSearch for ExhaustiveSearch {
    fn for_each_partition(&self, free: &[UnitId], visit: &mut dyn FnMut(&[UnitId], &[UnitId])) {
        let n = free.len();
        let mut side_a: Vec<UnitId> = Vec::with_capacity(n);
        let mut side_b: Vec<UnitId> = Vec::with_capacity(n);
        let mut chosen = vec![false; n];

        for size in 0..=n {
            let mut indices: Vec<usize> = (0..size).collect();
            loop {
                chosen.iter_mut().for_each(|c| *c = false);
                for &i in &indices {
                    chosen[i] = true;
                }

                side_a.clear();
                side_b.clear();
                for (unit, in_a) in free.iter().zip(&chosen) {
                    if *in_a {
                        side_a.push(unit.clone());
                    } else {
                        side_b.push(unit.clone());
                    }
                }
                visit(&side_a, &side_b);

                if !next_combination(&mut indices, n) {
                    break;
                }
            }
        }
    }

    fn candidate_count(&self, free_units: usize) -> u128 {
        1u128.checked_shl(free_units as u32).unwrap_or(u128::MAX)
    }
}

/// Advance `indices` to the next `k`-combination of `0..n` in lexicographic
/// order; false once the last one has been produced
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(names: &[&str]) -> Vec<UnitId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn collect(free: &[UnitId]) -> Vec<(Vec<UnitId>, Vec<UnitId>)> {
        let mut seen = Vec::new();
        ExhaustiveSearch.for_each_partition(free, &mut |a, b| seen.push((a.to_vec(), b.to_vec())));
        seen
    }

    #[test]
    fn test_visits_every_subset_once() {
        let free = units(&["a", "b", "c", "d"]);
        let seen = collect(&free);
        assert_eq!(seen.len(), 16);
        assert_eq!(ExhaustiveSearch.candidate_count(4), 16);

        for (a, b) in &seen {
            assert_eq!(a.len() + b.len(), 4);
        }
        let mut sides: Vec<_> = seen.iter().map(|(a, _)| a.clone()).collect();
        sides.sort();
        sides.dedup();
        assert_eq!(sides.len(), 16);
    }

    #[test]
    fn test_enumeration_order() {
        let free = units(&["a", "b", "c"]);
        let order: Vec<Vec<UnitId>> = collect(&free).into_iter().map(|(a, _)| a).collect();
        let expected: Vec<Vec<UnitId>> = vec![
            units(&[]),
            units(&["a"]),
            units(&["b"]),
            units(&["c"]),
            units(&["a", "b"]),
            units(&["a", "c"]),
            units(&["b", "c"]),
            units(&["a", "b", "c"]),
        ];
        assert_eq!(order, expected);
    }

    #[test]
    fn test_empty_input_yields_single_split() {
        let seen = collect(&[]);
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.is_empty() && seen[0].1.is_empty());
    }
}
