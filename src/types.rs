//! Common types used throughout the season engines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::error::{Result, SeasonError};
use crate::utils::{current_timestamp, generate_week_id, range_midpoint};

/// Unique identifier (name) of a unit
pub type UnitId = String;

/// Map identifier (map name)
pub type MapId = String;

/// Unique identifier for weeks
pub type WeekId = Uuid;

/// Unit name to division name
pub type DivisionMap = BTreeMap<UnitId, String>;

/// One of the two teams of a week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Historically fixed faction played by a side. Side A plays the Union
/// unless the round is flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Union,
    Confederate,
}

impl Faction {
    pub fn opposite(self) -> Faction {
        match self {
            Faction::Union => Faction::Confederate,
            Faction::Confederate => Faction::Union,
        }
    }

    /// Side playing this faction in a round with the given flip state
    pub fn side(self, flipped: bool) -> Side {
        let union_side = if flipped { Side::B } else { Side::A };
        match self {
            Faction::Union => union_side,
            Faction::Confederate => union_side.opposite(),
        }
    }
}

/// The two rounds of a week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Round {
    First,
    Second,
}

impl Round {
    pub const ALL: [Round; 2] = [Round::First, Round::Second];

    pub fn index(self) -> usize {
        match self {
            Round::First => 0,
            Round::Second => 1,
        }
    }

    pub fn number(self) -> u32 {
        self.index() as u32 + 1
    }
}

/// Per-week player-count range of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerRange {
    pub min: u32,
    pub max: u32,
}

impl PlayerRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        range_midpoint(self.min, self.max)
    }

    /// A 0-0 range marks the unit as absent for the week
    pub fn is_absent(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

/// A schedulable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: UnitId,
    /// Typical headcount, used when a week records none
    #[serde(default)]
    pub players: Option<PlayerRange>,
    #[serde(default)]
    pub division: Option<String>,
    /// Non-token units play and are rated but earn no points
    #[serde(default)]
    pub non_token: bool,
}

impl Unit {
    pub fn new(name: impl Into<UnitId>) -> Self {
        Self {
            name: name.into(),
            players: None,
            division: None,
            non_token: false,
        }
    }

    pub fn with_players(mut self, min: u32, max: u32) -> Self {
        self.players = Some(PlayerRange::new(min, max));
        self
    }

    pub fn in_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    pub fn non_token(mut self) -> Self {
        self.non_token = true;
        self
    }
}

/// Named grouping of units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    pub units: Vec<UnitId>,
}

/// Discrete attack/defence bias of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasLevel {
    #[default]
    Balanced,
    LightAttacker,
    HeavyAttacker,
    LightDefender,
    HeavyDefender,
}

impl BiasLevel {
    /// Decode the legacy numeric bias code (0, 1, 1.5, 2, 2.5)
    pub fn from_code(code: f64) -> Option<BiasLevel> {
        match (code * 2.0).round() as i64 {
            0 => Some(BiasLevel::Balanced),
            2 => Some(BiasLevel::LightAttacker),
            3 => Some(BiasLevel::HeavyAttacker),
            4 => Some(BiasLevel::LightDefender),
            5 => Some(BiasLevel::HeavyDefender),
            _ => None,
        }
    }
}

/// Static classification of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub bias: BiasLevel,
    /// Faction that attacks on this map
    pub attacker: Faction,
}

/// Lead unit declared for each side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLeads {
    pub a: Option<UnitId>,
    pub b: Option<UnitId>,
}

impl SideLeads {
    pub fn new(a: Option<UnitId>, b: Option<UnitId>) -> Self {
        Self { a, b }
    }

    pub fn get(&self, side: Side) -> Option<&UnitId> {
        match side {
            Side::A => self.a.as_ref(),
            Side::B => self.b.as_ref(),
        }
    }

    pub fn set(&mut self, side: Side, unit: Option<UnitId>) {
        match side {
            Side::A => self.a = unit,
            Side::B => self.b = unit,
        }
    }
}

/// How leads are declared for a week, and whether it counts as playoffs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WeekMode {
    /// One lead per side for the whole week
    Normal { leads: SideLeads },
    /// Playoff week: per-round leads, no points, playoff rating multiplier
    Playoffs { rounds: [SideLeads; 2] },
    /// Regular week where each round has its own leads
    SingleRoundLeads { rounds: [SideLeads; 2] },
}

impl Default for WeekMode {
    fn default() -> Self {
        WeekMode::Normal {
            leads: SideLeads::default(),
        }
    }
}

impl WeekMode {
    pub fn is_playoffs(&self) -> bool {
        matches!(self, WeekMode::Playoffs { .. })
    }

    /// Lead of `side` for `round`
    pub fn lead(&self, round: Round, side: Side) -> Option<&UnitId> {
        match self {
            WeekMode::Normal { leads } => leads.get(side),
            WeekMode::Playoffs { rounds } | WeekMode::SingleRoundLeads { rounds } => {
                rounds[round.index()].get(side)
            }
        }
    }

    /// All distinct leads of `side` across the week
    pub fn leads_for(&self, side: Side) -> Vec<&UnitId> {
        let mut leads: Vec<&UnitId> = Vec::new();
        for round in Round::ALL {
            if let Some(lead) = self.lead(round, side) {
                if !leads.contains(&lead) {
                    leads.push(lead);
                }
            }
        }
        leads
    }
}

/// Outcome record of one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    #[serde(default)]
    pub winner: Option<Side>,
    #[serde(default)]
    pub map: Option<MapId>,
    /// Side B plays the Union when set
    #[serde(default)]
    pub flipped: bool,
}

/// A single week of the season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub id: WeekId,
    pub name: String,
    pub team_a: Vec<UnitId>,
    pub team_b: Vec<UnitId>,
    pub rounds: [RoundResult; 2],
    #[serde(default)]
    pub mode: WeekMode,
    /// Headcounts recorded for this week
    #[serde(default)]
    pub player_counts: BTreeMap<UnitId, PlayerRange>,
    /// Map classification in force when the week was created
    #[serde(default)]
    pub map_biases: BTreeMap<MapId, MapInfo>,
    pub created_at: DateTime<Utc>,
}

impl Week {
    /// Create an empty week with a snapshot of the current map classification
    pub fn new(name: impl Into<String>, map_biases: BTreeMap<MapId, MapInfo>) -> Self {
        Self {
            id: generate_week_id(),
            name: name.into(),
            team_a: Vec::new(),
            team_b: Vec::new(),
            rounds: [RoundResult::default(), RoundResult::default()],
            mode: WeekMode::default(),
            player_counts: BTreeMap::new(),
            map_biases,
            created_at: current_timestamp(),
        }
    }

    /// Replace both rosters, rejecting duplicates and units on both sides
    pub fn with_teams(mut self, team_a: Vec<UnitId>, team_b: Vec<UnitId>) -> Result<Self> {
        validate_rosters(&team_a, &team_b)?;
        self.team_a = team_a;
        self.team_b = team_b;
        Ok(self)
    }

    pub fn with_round(mut self, round: Round, result: RoundResult) -> Self {
        self.rounds[round.index()] = result;
        self
    }

    pub fn with_mode(mut self, mode: WeekMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_player_count(mut self, unit: impl Into<UnitId>, min: u32, max: u32) -> Self {
        self.player_counts
            .insert(unit.into(), PlayerRange::new(min, max));
        self
    }

    pub fn team(&self, side: Side) -> &[UnitId] {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn side_of(&self, unit: &str) -> Option<Side> {
        if self.team_a.iter().any(|u| u == unit) {
            Some(Side::A)
        } else if self.team_b.iter().any(|u| u == unit) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn has_both_rosters(&self) -> bool {
        !self.team_a.is_empty() && !self.team_b.is_empty()
    }

    pub fn round(&self, round: Round) -> &RoundResult {
        &self.rounds[round.index()]
    }

    pub fn winner(&self, round: Round) -> Option<Side> {
        self.rounds[round.index()].winner
    }

    pub fn has_results(&self) -> bool {
        self.rounds.iter().any(|r| r.winner.is_some())
    }

    /// Side that won both rounds, if any
    pub fn sweep(&self) -> Option<Side> {
        match (self.rounds[0].winner, self.rounds[1].winner) {
            (Some(first), Some(second)) if first == second => Some(first),
            _ => None,
        }
    }

    /// Side attacking in `round`, when the map is set. Maps missing from the
    /// snapshot are treated as Confederate attacks.
    pub fn attacker(&self, round: Round) -> Option<Side> {
        let result = self.round(round);
        let map = result.map.as_ref()?;
        let faction = self
            .map_biases
            .get(map)
            .map(|info| info.attacker)
            .unwrap_or(Faction::Confederate);
        Some(faction.side(result.flipped))
    }

    /// Bias level of the map played in `round`
    pub fn bias_level(&self, round: Round) -> Option<BiasLevel> {
        let map = self.round(round).map.as_ref()?;
        Some(
            self.map_biases
                .get(map)
                .map(|info| info.bias)
                .unwrap_or_default(),
        )
    }

    /// Every unit fielded this week
    pub fn participants(&self) -> impl Iterator<Item = &UnitId> {
        self.team_a.iter().chain(self.team_b.iter())
    }
}

/// Both rosters must be free of duplicates and disjoint
pub fn validate_rosters(team_a: &[UnitId], team_b: &[UnitId]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for unit in team_a.iter().chain(team_b.iter()) {
        if !seen.insert(unit.as_str()) {
            return Err(SeasonError::InvalidWeek {
                reason: format!("unit {} appears more than once", unit),
            }
            .into());
        }
    }
    Ok(())
}
