//! Season aggregate: roster, divisions, ordered weeks and map catalog
//!
//! Weeks are only changed through the explicit operations below; every
//! derived view (ratings, standings, histories) is recomputed from a prefix
//! of `weeks`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, SeasonError};
use crate::maps::MapCatalog;
use crate::types::{
    validate_rosters, Division, DivisionMap, PlayerRange, Side, Unit, UnitId, Week, WeekId,
};

/// Full season state as supplied by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub units: Vec<Unit>,
    /// Division names in display order
    #[serde(default)]
    pub divisions: Vec<String>,
    #[serde(default)]
    pub weeks: Vec<Week>,
    #[serde(default = "MapCatalog::war_of_rights")]
    pub maps: MapCatalog,
    /// Manual point corrections per unit
    #[serde(default)]
    pub manual_adjustments: BTreeMap<UnitId, i32>,
}

impl Default for Season {
    fn default() -> Self {
        Self::new(MapCatalog::war_of_rights())
    }
}

impl Season {
    pub fn new(maps: MapCatalog) -> Self {
        Self {
            units: Vec::new(),
            divisions: Vec::new(),
            weeks: Vec::new(),
            maps,
            manual_adjustments: BTreeMap::new(),
        }
    }

    // Units

    pub fn add_unit(&mut self, unit: Unit) -> Result<()> {
        if self.unit(&unit.name).is_some() {
            return Err(SeasonError::DuplicateUnit { unit: unit.name }.into());
        }
        if let Some(division) = &unit.division {
            self.require_division(division)?;
        }
        self.units.push(unit);
        Ok(())
    }

    /// Remove a unit from the roster; recorded weeks keep their rosters
    pub fn remove_unit(&mut self, name: &str) -> Result<Unit> {
        let idx = self.unit_index(name)?;
        self.manual_adjustments.remove(name);
        Ok(self.units.remove(idx))
    }

    /// Flip the non-token flag, returning the new value
    pub fn toggle_non_token(&mut self, name: &str) -> Result<bool> {
        let idx = self.unit_index(name)?;
        let unit = &mut self.units[idx];
        unit.non_token = !unit.non_token;
        Ok(unit.non_token)
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    fn unit_index(&self, name: &str) -> Result<usize> {
        self.units
            .iter()
            .position(|u| u.name == name)
            .ok_or_else(|| {
                SeasonError::UnknownUnit {
                    unit: name.to_string(),
                }
                .into()
            })
    }

    pub fn unit_names(&self) -> Vec<UnitId> {
        self.units.iter().map(|u| u.name.clone()).collect()
    }

    /// Units that count toward points and standings
    pub fn token_units(&self) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| !u.non_token)
            .map(|u| u.name.clone())
            .collect()
    }

    pub fn set_manual_adjustment(&mut self, name: &str, points: i32) -> Result<()> {
        self.unit_index(name)?;
        self.manual_adjustments.insert(name.to_string(), points);
        Ok(())
    }

    // Weeks

    /// Append an empty week. Headcounts are inherited from the previous week
    /// when it recorded any, otherwise from the roster.
    pub fn add_week(&mut self) -> &Week {
        let inherited = match self.weeks.last() {
            Some(last) if !last.player_counts.is_empty() => last.player_counts.clone(),
            _ => self.roster_player_counts(),
        };

        let mut week = Week::new(format!("Week {}", self.weeks.len() + 1), self.maps.snapshot());
        week.player_counts = inherited;
        debug!("Adding {} ({})", week.name, week.id);

        self.weeks.push(week);
        &self.weeks[self.weeks.len() - 1]
    }

    /// Append a fully built week after validating its rosters
    pub fn push_week(&mut self, week: Week) -> Result<()> {
        validate_rosters(&week.team_a, &week.team_b)?;
        self.weeks.push(week);
        Ok(())
    }

    pub fn remove_week(&mut self, id: WeekId) -> Result<Week> {
        let idx = self.week_index(id)?;
        Ok(self.weeks.remove(idx))
    }

    pub fn week_index(&self, id: WeekId) -> Result<usize> {
        self.weeks.iter().position(|w| w.id == id).ok_or_else(|| {
            SeasonError::UnknownWeek {
                week: id.to_string(),
            }
            .into()
        })
    }

    /// Apply `update` to a copy of the week and replace it if the result is valid
    pub fn update_week<F>(&mut self, id: WeekId, update: F) -> Result<()>
    where
        F: FnOnce(&mut Week),
    {
        let idx = self.week_index(id)?;
        let mut week = self.weeks[idx].clone();
        update(&mut week);
        validate_rosters(&week.team_a, &week.team_b)?;
        if week.id != id {
            return Err(SeasonError::InvalidWeek {
                reason: "week id cannot be changed".to_string(),
            }
            .into());
        }
        self.weeks[idx] = week;
        Ok(())
    }

    pub fn rename_week(&mut self, id: WeekId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.update_week(id, |week| week.name = name)
    }

    /// Place `unit` on `side`, taking it off the other side if needed
    pub fn move_unit_to_team(&mut self, id: WeekId, unit: &str, side: Side) -> Result<()> {
        self.unit_index(unit)?;
        self.update_week(id, |week| {
            week.team_a.retain(|u| u != unit);
            week.team_b.retain(|u| u != unit);
            match side {
                Side::A => week.team_a.push(unit.to_string()),
                Side::B => week.team_b.push(unit.to_string()),
            }
        })
    }

    pub fn remove_unit_from_team(&mut self, id: WeekId, unit: &str) -> Result<()> {
        self.update_week(id, |week| {
            week.team_a.retain(|u| u != unit);
            week.team_b.retain(|u| u != unit);
        })
    }

    /// Weeks `0..=index`; the whole season when `index` is past the end
    pub fn weeks_through(&self, index: usize) -> &[Week] {
        let end = (index + 1).min(self.weeks.len());
        &self.weeks[..end]
    }

    /// Weeks strictly before `index`
    pub fn weeks_before(&self, index: usize) -> &[Week] {
        &self.weeks[..index.min(self.weeks.len())]
    }

    /// Roster units not fielded in the given week
    pub fn available_units(&self, id: WeekId) -> Result<Vec<UnitId>> {
        let week = &self.weeks[self.week_index(id)?];
        Ok(self
            .units
            .iter()
            .filter(|u| week.side_of(&u.name).is_none())
            .map(|u| u.name.clone())
            .collect())
    }

    /// Headcounts for balancing a week: week-specific, then roster, then `fallback`
    pub fn balancer_counts(&self, id: WeekId, fallback: PlayerRange) -> Result<BTreeMap<UnitId, PlayerRange>> {
        let idx = self.week_index(id)?;
        let week = &self.weeks[idx];
        let source = if !week.player_counts.is_empty() {
            week.player_counts.clone()
        } else if idx > 0 && !self.weeks[idx - 1].player_counts.is_empty() {
            self.weeks[idx - 1].player_counts.clone()
        } else {
            self.roster_player_counts()
        };

        Ok(self
            .units
            .iter()
            .map(|u| {
                let range = source.get(&u.name).copied().unwrap_or(fallback);
                (u.name.clone(), range)
            })
            .collect())
    }

    pub fn roster_player_counts(&self) -> BTreeMap<UnitId, PlayerRange> {
        self.units
            .iter()
            .filter_map(|u| u.players.map(|p| (u.name.clone(), p)))
            .collect()
    }

    pub fn headcounts(&self, default: f64) -> Headcounts {
        Headcounts::new(self.roster_player_counts(), default)
    }

    // Divisions

    pub fn add_division(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.divisions.contains(&name) {
            return Err(SeasonError::ConfigurationError {
                message: format!("Division already exists: {}", name),
            }
            .into());
        }
        self.divisions.push(name);
        Ok(())
    }

    pub fn rename_division(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        let idx = self.division_index(old)?;
        if self.divisions.contains(&new) {
            return Err(SeasonError::ConfigurationError {
                message: format!("Division already exists: {}", new),
            }
            .into());
        }
        self.divisions[idx] = new.clone();
        for unit in self.units.iter_mut() {
            if unit.division.as_deref() == Some(old) {
                unit.division = Some(new.clone());
            }
        }
        Ok(())
    }

    /// Delete a division; its units become unassigned
    pub fn delete_division(&mut self, name: &str) -> Result<()> {
        let idx = self.division_index(name)?;
        self.divisions.remove(idx);
        for unit in self.units.iter_mut() {
            if unit.division.as_deref() == Some(name) {
                unit.division = None;
            }
        }
        Ok(())
    }

    pub fn assign_division(&mut self, division: &str, unit: &str) -> Result<()> {
        self.require_division(division)?;
        let idx = self.unit_index(unit)?;
        self.units[idx].division = Some(division.to_string());
        Ok(())
    }

    pub fn unassign_division(&mut self, unit: &str) -> Result<()> {
        let idx = self.unit_index(unit)?;
        self.units[idx].division = None;
        Ok(())
    }

    fn division_index(&self, name: &str) -> Result<usize> {
        self.divisions
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| {
                SeasonError::UnknownDivision {
                    division: name.to_string(),
                }
                .into()
            })
    }

    fn require_division(&self, name: &str) -> Result<()> {
        self.division_index(name).map(|_| ())
    }

    pub fn division_map(&self) -> DivisionMap {
        self.units
            .iter()
            .filter_map(|u| u.division.as_ref().map(|d| (u.name.clone(), d.clone())))
            .collect()
    }

    /// Divisions with their members, in division order
    pub fn division_groups(&self) -> Vec<Division> {
        self.divisions
            .iter()
            .map(|name| Division {
                name: name.clone(),
                units: self
                    .units
                    .iter()
                    .filter(|u| u.division.as_deref() == Some(name.as_str()))
                    .map(|u| u.name.clone())
                    .collect(),
            })
            .collect()
    }

    pub fn unassigned_units(&self) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.division.is_none())
            .map(|u| u.name.clone())
            .collect()
    }
}

/// Resolves the headcount a unit fielded in a given week
#[derive(Debug, Clone)]
pub struct Headcounts {
    roster: BTreeMap<UnitId, PlayerRange>,
    default: f64,
}

impl Headcounts {
    pub fn new(roster: BTreeMap<UnitId, PlayerRange>, default: f64) -> Self {
        Self { roster, default }
    }

    /// Midpoint of the week's recorded range, then the roster range, then the default
    pub fn for_week(&self, unit: &str, week: &Week) -> f64 {
        week.player_counts
            .get(unit)
            .or_else(|| self.roster.get(unit))
            .map(|range| range.midpoint())
            .unwrap_or(self.default)
    }

    /// Headcount outside any recorded week
    pub fn typical(&self, unit: &str) -> f64 {
        self.roster
            .get(unit)
            .map(|range| range.midpoint())
            .unwrap_or(self.default)
    }
}
