//! Points and lead/assist records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::PointSystem;
use crate::types::{Round, Side, UnitId, Week};

/// Points and round record of one unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub points: i32,
    pub lead_wins: u32,
    pub lead_losses: u32,
    pub assist_wins: u32,
    pub assist_losses: u32,
}

impl UnitRecord {
    pub fn wins(&self) -> u32 {
        self.lead_wins + self.assist_wins
    }

    pub fn losses(&self) -> u32 {
        self.lead_losses + self.assist_losses
    }
}

/// Tally points over `weeks`. Playoff rounds count toward the record but
/// award no points; a 2-0 week outside the playoffs adds the sweep bonus,
/// using the round-1 lead.
pub fn points_table(weeks: &[Week], system: &PointSystem) -> BTreeMap<UnitId, UnitRecord> {
    let mut table: BTreeMap<UnitId, UnitRecord> = BTreeMap::new();

    for week in weeks {
        let playoffs = week.mode.is_playoffs();

        for round in Round::ALL {
            let Some(winner) = week.winner(round) else {
                continue;
            };

            for side in Side::BOTH {
                let won = side == winner;
                let lead = week
                    .mode
                    .lead(round, side)
                    .filter(|lead| week.team(side).contains(lead));

                for unit in week.team(side) {
                    let record = table.entry(unit.clone()).or_default();
                    let is_lead = lead == Some(unit);
                    let points = match (won, is_lead) {
                        (true, true) => {
                            record.lead_wins += 1;
                            system.win_lead
                        }
                        (true, false) => {
                            record.assist_wins += 1;
                            system.win_assist
                        }
                        (false, true) => {
                            record.lead_losses += 1;
                            system.loss_lead
                        }
                        (false, false) => {
                            record.assist_losses += 1;
                            system.loss_assist
                        }
                    };
                    if !playoffs {
                        record.points += points;
                    }
                }
            }
        }

        if let (false, Some(side)) = (playoffs, week.sweep()) {
            let lead = week.mode.lead(Round::First, side);
            for unit in week.team(side) {
                let bonus = if lead == Some(unit) {
                    system.sweep_lead
                } else {
                    system.sweep_assist
                };
                table.entry(unit.clone()).or_default().points += bonus;
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RoundResult, SideLeads, WeekMode};
    use std::collections::BTreeMap as Map;

    fn names(units: &[&str]) -> Vec<UnitId> {
        units.iter().map(|u| u.to_string()).collect()
    }

    fn won_by(side: Side) -> RoundResult {
        RoundResult {
            winner: Some(side),
            ..RoundResult::default()
        }
    }

    fn week(winners: [Side; 2], mode: WeekMode) -> Week {
        Week::new("Week", Map::new())
            .with_teams(names(&["la", "aa"]), names(&["lb", "ab"]))
            .unwrap()
            .with_round(Round::First, won_by(winners[0]))
            .with_round(Round::Second, won_by(winners[1]))
            .with_mode(mode)
    }

    fn normal_leads() -> WeekMode {
        WeekMode::Normal {
            leads: SideLeads::new(Some("la".to_string()), Some("lb".to_string())),
        }
    }

    #[test]
    fn test_split_week_points() {
        let table = points_table(&[week([Side::A, Side::B], normal_leads())], &PointSystem::default());

        // lead: win 4 + loss 0; assist: win 2 + loss 1
        assert_eq!(table["la"].points, 4);
        assert_eq!(table["aa"].points, 3);
        assert_eq!(table["lb"].points, 4);
        assert_eq!(table["la"].lead_wins, 1);
        assert_eq!(table["la"].lead_losses, 1);
        assert_eq!(table["ab"].assist_wins, 1);
    }

    #[test]
    fn test_sweep_bonus() {
        let table = points_table(&[week([Side::A, Side::A], normal_leads())], &PointSystem::default());
        assert_eq!(table["la"].points, 8);
        assert_eq!(table["aa"].points, 5);
        assert_eq!(table["lb"].points, 0);
        assert_eq!(table["ab"].points, 2);
    }

    #[test]
    fn test_playoffs_record_without_points() {
        let mode = WeekMode::Playoffs {
            rounds: [
                SideLeads::new(Some("la".to_string()), None),
                SideLeads::new(Some("aa".to_string()), None),
            ],
        };
        let table = points_table(&[week([Side::A, Side::A], mode)], &PointSystem::default());

        assert_eq!(table["la"].points, 0);
        assert_eq!(table["la"].lead_wins, 1);
        assert_eq!(table["la"].assist_wins, 1);
        assert_eq!(table["aa"].lead_wins, 1);
        assert_eq!(table["lb"].assist_losses, 2);
    }

    #[test]
    fn test_lead_not_on_team_is_ignored() {
        let mode = WeekMode::Normal {
            leads: SideLeads::new(Some("elsewhere".to_string()), None),
        };
        let table = points_table(&[week([Side::A, Side::B], mode)], &PointSystem::default());
        assert_eq!(table["la"].lead_wins, 0);
        assert_eq!(table["la"].assist_wins, 1);
        assert!(!table.contains_key("elsewhere"));
    }
}
