//! Standings with week-over-week changes
//!
//! Standings "as of week N" fold the points and ratings over weeks `0..=N`
//! and compare against the same fold over `0..N`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{EloSettings, PointSystem};
use crate::error::Result;
use crate::rating::{RatingCalculator, WeightedEloCalculator};
use crate::season::Season;
use crate::standings::points::{points_table, UnitRecord};
use crate::types::{UnitId, Week};

/// Group name for units outside every division
pub const UNASSIGNED_GROUP: &str = "Unassigned";

/// Ordering of a standings table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingsOrder {
    #[default]
    Points,
    Rating,
}

/// One row of the standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub unit: UnitId,
    pub division: Option<String>,
    /// Points including manual adjustments
    pub points: i32,
    pub record: UnitRecord,
    pub rating: f64,
    pub rating_delta: f64,
    pub rounds_played: u32,
    /// 1-based
    pub rank: usize,
    pub previous_rank: Option<usize>,
    /// Positive when the unit climbed
    pub rank_delta: Option<i64>,
    /// Rank within the unit's division, set on grouped standings only
    pub division_rank: Option<usize>,
}

/// Standings of one division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionStandings {
    pub name: String,
    pub entries: Vec<StandingEntry>,
}

/// Points and ratings of every token unit over one season prefix
struct Snapshot {
    records: BTreeMap<UnitId, UnitRecord>,
    ratings: BTreeMap<UnitId, f64>,
    rounds: BTreeMap<UnitId, u32>,
    ranks: BTreeMap<UnitId, usize>,
}

/// Standings calculator
pub struct Standings {
    calculator: Box<dyn RatingCalculator>,
    points: PointSystem,
}

impl std::fmt::Debug for Standings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Standings")
            .field("calculator", &self.calculator.config())
            .field("points", &self.points)
            .finish()
    }
}

impl Standings {
    pub fn new(elo: EloSettings, points: PointSystem) -> Result<Self> {
        Ok(Self {
            calculator: Box::new(WeightedEloCalculator::new(elo)?),
            points,
        })
    }

    pub fn with_calculator(calculator: Box<dyn RatingCalculator>, points: PointSystem) -> Self {
        Self { calculator, points }
    }

    /// Standings as of week `week_index`, clamped to the last recorded week
    pub fn compute(
        &self,
        season: &Season,
        week_index: usize,
        order: StandingsOrder,
    ) -> Result<Vec<StandingEntry>> {
        let index = week_index.min(season.weeks.len().saturating_sub(1));
        let units = season.token_units();

        let current = self.snapshot(season, season.weeks_through(index), &units, order)?;
        let previous = if index > 0 {
            Some(self.snapshot(season, season.weeks_before(index), &units, order)?)
        } else {
            None
        };

        let suppress_rank_delta = order == StandingsOrder::Points
            && season
                .weeks
                .get(index)
                .map_or(false, |week| week.mode.is_playoffs());
        let divisions = season.division_map();
        let initial = self.calculator.initial_rating();

        let mut entries: Vec<StandingEntry> = units
            .iter()
            .map(|unit| {
                let record = current.records.get(unit).copied().unwrap_or_default();
                let rating = current.ratings.get(unit).copied().unwrap_or(initial);
                let rank = current.ranks.get(unit).copied().unwrap_or(units.len());

                let previous_rating = previous
                    .as_ref()
                    .and_then(|p| p.ratings.get(unit).copied())
                    .unwrap_or(initial);
                let previous_rank = previous.as_ref().and_then(|p| p.ranks.get(unit).copied());
                let rank_delta = match previous_rank {
                    Some(before) if !suppress_rank_delta => Some(before as i64 - rank as i64),
                    _ => None,
                };

                StandingEntry {
                    unit: unit.clone(),
                    division: divisions.get(unit).cloned(),
                    points: record.points + manual(season, unit),
                    record,
                    rating,
                    rating_delta: rating - previous_rating,
                    rounds_played: current.rounds.get(unit).copied().unwrap_or(0),
                    rank,
                    previous_rank,
                    rank_delta,
                    division_rank: None,
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.rank);

        debug!(
            "Standings through week {} ({:?}): {} units",
            index + 1,
            order,
            entries.len()
        );
        Ok(entries)
    }

    /// Standings split per division in division order, ranked within each
    /// group, followed by the unassigned units
    pub fn grouped(
        &self,
        season: &Season,
        week_index: usize,
        order: StandingsOrder,
    ) -> Result<Vec<DivisionStandings>> {
        let entries = self.compute(season, week_index, order)?;

        let mut groups: Vec<DivisionStandings> = season
            .divisions
            .iter()
            .map(|name| group(name, &entries, Some(name.as_str())))
            .collect();

        let unassigned = group(UNASSIGNED_GROUP, &entries, None);
        if !unassigned.entries.is_empty() {
            groups.push(unassigned);
        }
        Ok(groups)
    }

    fn snapshot(
        &self,
        season: &Season,
        weeks: &[Week],
        units: &[UnitId],
        order: StandingsOrder,
    ) -> Result<Snapshot> {
        let records = points_table(weeks, &self.points);
        let state = self.calculator.compute_ratings(&season.units, weeks)?;

        let mut ordered: Vec<&UnitId> = units.iter().collect();
        match order {
            StandingsOrder::Points => ordered.sort_by(|a, b| {
                let points = |unit: &str| {
                    records.get(unit).map_or(0, |r| r.points) + manual(season, unit)
                };
                points(b.as_str())
                    .cmp(&points(a.as_str()))
                    .then_with(|| a.cmp(b))
            }),
            StandingsOrder::Rating => ordered.sort_by(|a, b| {
                state
                    .rating(b)
                    .total_cmp(&state.rating(a))
                    .then_with(|| a.cmp(b))
            }),
        }

        let ranks = ordered
            .into_iter()
            .enumerate()
            .map(|(i, unit)| (unit.clone(), i + 1))
            .collect();

        Ok(Snapshot {
            records,
            ratings: state.ratings,
            rounds: state.rounds_played,
            ranks,
        })
    }
}

fn manual(season: &Season, unit: &str) -> i32 {
    season.manual_adjustments.get(unit).copied().unwrap_or(0)
}

fn group(name: &str, entries: &[StandingEntry], division: Option<&str>) -> DivisionStandings {
    let entries = entries
        .iter()
        .filter(|entry| entry.division.as_deref() == division)
        .enumerate()
        .map(|(i, entry)| StandingEntry {
            division_rank: Some(i + 1),
            ..entry.clone()
        })
        .collect();
    DivisionStandings {
        name: name.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Round, RoundResult, Side, SideLeads, Unit, WeekMode};

    fn sweep_week(a: &str, b: &str, mode: Option<WeekMode>) -> Week {
        let won = RoundResult {
            winner: Some(Side::A),
            ..RoundResult::default()
        };
        let mode = mode.unwrap_or(WeekMode::Normal {
            leads: SideLeads::new(Some(a.to_string()), Some(b.to_string())),
        });
        Week::new("Week", BTreeMap::new())
            .with_teams(vec![a.to_string()], vec![b.to_string()])
            .unwrap()
            .with_round(Round::First, won.clone())
            .with_round(Round::Second, won)
            .with_mode(mode)
    }

    fn season(second_week: Option<WeekMode>) -> Season {
        let mut season = Season::default();
        season.add_division("North").unwrap();
        for name in ["a", "b", "c"] {
            season.add_unit(Unit::new(name).with_players(20, 30)).unwrap();
        }
        season.add_unit(Unit::new("d").non_token()).unwrap();
        season.assign_division("North", "a").unwrap();
        season.assign_division("North", "c").unwrap();
        season.set_manual_adjustment("c", 1).unwrap();

        season.push_week(sweep_week("a", "b", None)).unwrap();
        season.push_week(sweep_week("b", "c", second_week)).unwrap();
        season
    }

    fn standings() -> Standings {
        Standings::new(EloSettings::default(), PointSystem::default()).unwrap()
    }

    fn entry<'a>(entries: &'a [StandingEntry], unit: &str) -> &'a StandingEntry {
        entries.iter().find(|e| e.unit == unit).unwrap()
    }

    #[test]
    fn test_points_order_with_rank_changes() {
        let entries = standings()
            .compute(&season(None), 1, StandingsOrder::Points)
            .unwrap();

        let order: Vec<&str> = entries.iter().map(|e| e.unit.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(entry(&entries, "a").points, 8);
        assert_eq!(entry(&entries, "b").points, 8);
        assert_eq!(entry(&entries, "c").points, 1);

        // week 1 order was a, c (manual point), b
        assert_eq!(entry(&entries, "b").previous_rank, Some(3));
        assert_eq!(entry(&entries, "b").rank_delta, Some(1));
        assert_eq!(entry(&entries, "c").rank_delta, Some(-1));
        assert_eq!(entry(&entries, "a").rank_delta, Some(0));
    }

    #[test]
    fn test_rating_deltas_follow_last_week() {
        let entries = standings()
            .compute(&season(None), 1, StandingsOrder::Rating)
            .unwrap();

        assert_eq!(entry(&entries, "a").rating_delta, 0.0);
        assert!(entry(&entries, "b").rating_delta > 0.0);
        assert!(entry(&entries, "c").rating_delta < 0.0);
        assert_eq!(entry(&entries, "c").rounds_played, 2);
        assert!(entries.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_non_token_units_excluded() {
        let entries = standings()
            .compute(&season(None), 5, StandingsOrder::Points)
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.unit != "d"));
    }

    #[test]
    fn test_first_week_has_no_previous_rank() {
        let entries = standings()
            .compute(&season(None), 0, StandingsOrder::Points)
            .unwrap();
        assert!(entries.iter().all(|e| e.previous_rank.is_none()));
        assert!(entries.iter().all(|e| e.rank_delta.is_none()));
    }

    #[test]
    fn test_playoff_week_suppresses_point_rank_delta() {
        let playoffs = WeekMode::Playoffs {
            rounds: [SideLeads::default(), SideLeads::default()],
        };
        let season = season(Some(playoffs));

        let by_points = standings()
            .compute(&season, 1, StandingsOrder::Points)
            .unwrap();
        assert!(by_points.iter().all(|e| e.rank_delta.is_none()));
        assert!(by_points.iter().all(|e| e.previous_rank.is_some()));
        // no points in the playoffs
        assert_eq!(entry(&by_points, "b").points, 0);
        assert_eq!(entry(&by_points, "b").record.assist_wins, 2);

        let by_rating = standings()
            .compute(&season, 1, StandingsOrder::Rating)
            .unwrap();
        assert!(by_rating.iter().all(|e| e.rank_delta.is_some()));
    }

    #[test]
    fn test_grouped_by_division() {
        let groups = standings()
            .grouped(&season(None), 1, StandingsOrder::Points)
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "North");
        let north: Vec<(&str, Option<usize>)> = groups[0]
            .entries
            .iter()
            .map(|e| (e.unit.as_str(), e.division_rank))
            .collect();
        assert_eq!(north, vec![("a", Some(1)), ("c", Some(2))]);

        assert_eq!(groups[1].name, UNASSIGNED_GROUP);
        assert_eq!(groups[1].entries[0].unit, "b");
        assert_eq!(groups[1].entries[0].division_rank, Some(1));
        assert_eq!(groups[1].entries[0].rank, 2);
    }
}
