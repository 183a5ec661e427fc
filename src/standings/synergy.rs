//! Pair synergy and full-lineup records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::probability::WinLoss;
use crate::types::{Round, Side, UnitId, Week};

/// Round record of a full lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupRecord {
    /// Sorted unit names
    pub units: Vec<UnitId>,
    pub wins: u32,
    pub games: u32,
}

impl LineupRecord {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

/// Round records of every teammate pair and every full lineup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synergy {
    pairs: BTreeMap<(UnitId, UnitId), WinLoss>,
    lineups: BTreeMap<Vec<UnitId>, WinLoss>,
}

impl Synergy {
    pub fn from_weeks(weeks: &[Week]) -> Self {
        let mut synergy = Self::default();

        for week in weeks {
            for round in Round::ALL {
                let Some(winner) = week.winner(round) else {
                    continue;
                };
                for side in Side::BOTH {
                    let won = side == winner;
                    let mut lineup = week.team(side).to_vec();
                    lineup.sort();

                    for (i, a) in lineup.iter().enumerate() {
                        for b in &lineup[i + 1..] {
                            synergy
                                .pairs
                                .entry((a.clone(), b.clone()))
                                .or_default()
                                .record(won);
                        }
                    }
                    synergy.lineups.entry(lineup).or_default().record(won);
                }
            }
        }

        synergy
    }

    /// Win rate of two units playing on the same side
    pub fn pair_win_rate(&self, a: &str, b: &str) -> Option<f64> {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.pairs.get(&key).and_then(|record| record.rate())
    }

    pub fn pairs(&self) -> &BTreeMap<(UnitId, UnitId), WinLoss> {
        &self.pairs
    }

    /// Highest win-rate lineups, best first
    pub fn best_lineups(&self, limit: usize) -> Vec<LineupRecord> {
        let mut ranked = self.ranked_lineups();
        ranked.truncate(limit);
        ranked
    }

    /// Lowest win-rate lineups, worst first
    pub fn worst_lineups(&self, limit: usize) -> Vec<LineupRecord> {
        let mut ranked = self.ranked_lineups();
        ranked.reverse();
        ranked.truncate(limit);
        ranked
    }

    fn ranked_lineups(&self) -> Vec<LineupRecord> {
        let mut ranked: Vec<LineupRecord> = self
            .lineups
            .iter()
            .filter(|(_, record)| record.games > 0)
            .map(|(units, record)| LineupRecord {
                units: units.clone(),
                wins: record.wins,
                games: record.games,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.win_rate()
                .total_cmp(&a.win_rate())
                .then_with(|| b.games.cmp(&a.games))
                .then_with(|| a.units.cmp(&b.units))
        });
        ranked
    }
}
