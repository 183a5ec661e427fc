//! Per-map outcome aggregation over a history prefix

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Faction, MapId, Round, Side, UnitId, Week};

/// Season-wide results on one map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub plays: u32,
    pub union_wins: u32,
    pub confederate_wins: u32,
}

impl MapRecord {
    pub fn wins_for(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Union => self.union_wins,
            Faction::Confederate => self.confederate_wins,
        }
    }
}

/// Win/loss tally of a unit (or team) on a map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: u32,
    pub games: u32,
}

impl WinLoss {
    pub fn losses(&self) -> u32 {
        self.games - self.wins
    }

    pub fn rate(&self) -> Option<f64> {
        if self.games == 0 {
            None
        } else {
            Some(self.wins as f64 / self.games as f64)
        }
    }

    pub fn record(&mut self, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }
}

impl std::ops::Add for WinLoss {
    type Output = WinLoss;

    fn add(self, other: WinLoss) -> WinLoss {
        WinLoss {
            wins: self.wins + other.wins,
            games: self.games + other.games,
        }
    }
}

/// Per-unit record split by whether the unit's side attacked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDefenseRecord {
    pub attack_wins: u32,
    pub attack_losses: u32,
    pub defend_wins: u32,
    pub defend_losses: u32,
}

/// Map outcomes of every decided round with a map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStatistics {
    maps: BTreeMap<MapId, MapRecord>,
    unit_maps: BTreeMap<(UnitId, MapId), WinLoss>,
    attack_defense: BTreeMap<UnitId, AttackDefenseRecord>,
}

impl MapStatistics {
    pub fn from_weeks(weeks: &[Week]) -> Self {
        let mut stats = Self::default();

        for week in weeks {
            for round in Round::ALL {
                let result = week.round(round);
                let (Some(winner), Some(map)) = (result.winner, result.map.as_ref()) else {
                    continue;
                };

                let record = stats.maps.entry(map.clone()).or_default();
                record.plays += 1;
                if winner == Faction::Union.side(result.flipped) {
                    record.union_wins += 1;
                } else {
                    record.confederate_wins += 1;
                }

                let attacker = week.attacker(round);
                for side in Side::BOTH {
                    let won = side == winner;
                    let attacking = attacker == Some(side);
                    for unit in week.team(side) {
                        stats
                            .unit_maps
                            .entry((unit.clone(), map.clone()))
                            .or_default()
                            .record(won);

                        let entry = stats.attack_defense.entry(unit.clone()).or_default();
                        match (attacking, won) {
                            (true, true) => entry.attack_wins += 1,
                            (true, false) => entry.attack_losses += 1,
                            (false, true) => entry.defend_wins += 1,
                            (false, false) => entry.defend_losses += 1,
                        }
                    }
                }
            }
        }

        stats
    }

    pub fn map(&self, map: &str) -> MapRecord {
        self.maps.get(map).copied().unwrap_or_default()
    }

    /// Every map played at least once
    pub fn maps(&self) -> &BTreeMap<MapId, MapRecord> {
        &self.maps
    }

    pub fn unit_on_map(&self, unit: &str, map: &str) -> WinLoss {
        self.unit_maps
            .get(&(unit.to_string(), map.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Summed record of a team's units on `map`
    pub fn team_on_map(&self, team: &[UnitId], map: &str) -> WinLoss {
        team.iter()
            .map(|unit| self.unit_on_map(unit, map))
            .fold(WinLoss::default(), |acc, record| acc + record)
    }

    /// Every map a unit has played, with its record
    pub fn unit_maps(&self, unit: &str) -> BTreeMap<MapId, WinLoss> {
        self.unit_maps
            .iter()
            .filter(|((u, _), _)| u == unit)
            .map(|((_, map), record)| (map.clone(), *record))
            .collect()
    }

    pub fn attack_defense(&self) -> &BTreeMap<UnitId, AttackDefenseRecord> {
        &self.attack_defense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::MapCatalog;
    use crate::types::RoundResult;

    fn played(map: &str, winner: Side, flipped: bool) -> RoundResult {
        RoundResult {
            winner: Some(winner),
            map: Some(map.to_string()),
            flipped,
        }
    }

    fn sample_weeks() -> Vec<Week> {
        let week = Week::new("Week 1", MapCatalog::war_of_rights().snapshot())
            .with_teams(
                vec!["u1".to_string(), "u2".to_string()],
                vec!["c1".to_string()],
            )
            .unwrap()
            .with_round(Round::First, played("Bloody Lane", Side::A, false))
            .with_round(Round::Second, played("Bloody Lane", Side::A, true));
        vec![week]
    }

    #[test]
    fn test_global_map_record_follows_faction() {
        let stats = MapStatistics::from_weeks(&sample_weeks());
        let record = stats.map("Bloody Lane");
        assert_eq!(record.plays, 2);
        // A is Union in round 1, Confederate when flipped in round 2
        assert_eq!(record.union_wins, 1);
        assert_eq!(record.confederate_wins, 1);
        assert_eq!(stats.map("Cornfield"), MapRecord::default());
    }

    #[test]
    fn test_unit_and_team_records() {
        let stats = MapStatistics::from_weeks(&sample_weeks());
        assert_eq!(
            stats.unit_on_map("u1", "Bloody Lane"),
            WinLoss { wins: 2, games: 2 }
        );
        assert_eq!(stats.unit_on_map("c1", "Bloody Lane").losses(), 2);

        let team = vec!["u1".to_string(), "u2".to_string(), "new".to_string()];
        assert_eq!(
            stats.team_on_map(&team, "Bloody Lane"),
            WinLoss { wins: 4, games: 4 }
        );
        assert_eq!(stats.unit_maps("u2").len(), 1);
    }

    #[test]
    fn test_attack_defense_split() {
        let stats = MapStatistics::from_weeks(&sample_weeks());
        // Union attacks Bloody Lane: A attacks round 1, B attacks round 2
        let u1 = stats.attack_defense()["u1"];
        assert_eq!(u1.attack_wins, 1);
        assert_eq!(u1.defend_wins, 1);
        let c1 = stats.attack_defense()["c1"];
        assert_eq!(c1.defend_losses, 1);
        assert_eq!(c1.attack_losses, 1);
    }

    #[test]
    fn test_rounds_without_map_or_winner_are_ignored() {
        let week = Week::new("Week 1", Default::default())
            .with_teams(vec!["a".to_string()], vec!["b".to_string()])
            .unwrap()
            .with_round(
                Round::First,
                RoundResult {
                    winner: Some(Side::A),
                    map: None,
                    flipped: false,
                },
            );
        let stats = MapStatistics::from_weeks(&[week]);
        assert!(stats.maps().is_empty());
        assert!(stats.attack_defense().is_empty());
    }
}
