//! Schedule generation
//!
//! Turns a lead plan into weeks: lead matchups fix each week's leads, the
//! remaining units are spread across the two sides by teammate history,
//! and (optionally) every round gets a random map, side flip and winner.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::ScheduleSettings;
use crate::error::{Result, SeasonError};
use crate::maps::MapCatalog;
use crate::schedule::matchups::{Matchup, MatchupGenerator};
use crate::season::TeammateHistory;
use crate::types::{
    DivisionMap, Round, RoundResult, Side, SideLeads, UnitId, Week, WeekMode,
};

/// How leads are packed into weeks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// One lead matchup per week, leading both rounds
    #[default]
    FullWeeks,
    /// Two lead matchups per week, one per round
    Rounds,
}

/// Inputs of one schedule run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Units to schedule (token units only)
    pub units: Vec<UnitId>,
    #[serde(default)]
    pub divisions: DivisionMap,
    pub lead_nights_per_unit: u32,
    #[serde(default)]
    pub lead_nights_in_division: u32,
    #[serde(default)]
    pub mode: ScheduleMode,
    /// Draw maps, flips and winners for every round
    #[serde(default)]
    pub simulate: bool,
    /// Number of weeks already in the season; generated names continue from it
    #[serde(default)]
    pub week_offset: usize,
}

impl ScheduleRequest {
    pub fn new(units: Vec<UnitId>, settings: &ScheduleSettings) -> Self {
        Self {
            units,
            divisions: DivisionMap::new(),
            lead_nights_per_unit: settings.lead_nights_per_unit,
            lead_nights_in_division: settings.lead_nights_in_division,
            mode: ScheduleMode::default(),
            simulate: false,
            week_offset: 0,
        }
    }
}

/// Generated weeks with the lead nights each unit received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub weeks: Vec<Week>,
    pub unit_lead_counts: BTreeMap<UnitId, u32>,
}

/// Result of a schedule run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    Complete(Schedule),
    /// Some units could not reach their lead-night quota
    Partial {
        schedule: Schedule,
        under_quota: Vec<UnitId>,
    },
}

impl ScheduleOutcome {
    pub fn schedule(&self) -> &Schedule {
        match self {
            ScheduleOutcome::Complete(schedule) => schedule,
            ScheduleOutcome::Partial { schedule, .. } => schedule,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ScheduleOutcome::Complete(_))
    }
}

/// Schedule generator over an injected random source
#[derive(Debug, Clone)]
pub struct ScheduleSimulator {
    settings: ScheduleSettings,
}

impl ScheduleSimulator {
    pub fn new(settings: ScheduleSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    /// Build weeks for `request`. `history` seeds the teammate counts used to
    /// place non-lead units and is extended as weeks are generated.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        request: &ScheduleRequest,
        history: &TeammateHistory,
        maps: &MapCatalog,
        rng: &mut R,
    ) -> Result<ScheduleOutcome> {
        validate_request(request)?;

        let plan = MatchupGenerator::new(
            &request.units,
            &request.divisions,
            request.lead_nights_per_unit,
            request.lead_nights_in_division,
        )
        .generate(rng, self.settings.max_attempts);

        let mut history = history.clone();
        let weeks_of_leads = pack_matchups(&plan.matchups, request.mode, &history);
        let map_names = maps.names();
        let mut weeks = Vec::with_capacity(weeks_of_leads.len());

        for (i, mode) in weeks_of_leads.into_iter().enumerate() {
            let name = format!("Week {}", request.week_offset + i + 1);
            let (team_a, team_b) = assign_sides(&request.units, &mode, &history, rng);

            let mut week = Week::new(name, maps.snapshot())
                .with_teams(team_a, team_b)?
                .with_mode(mode);
            if request.simulate {
                for round in Round::ALL {
                    week = week.with_round(round, simulate_round(&map_names, rng));
                }
            }

            history.record_team(&week.team_a);
            history.record_team(&week.team_b);
            weeks.push(week);
        }

        let schedule = Schedule {
            weeks,
            unit_lead_counts: plan.lead_counts,
        };
        if plan.under_quota.is_empty() {
            info!("Generated {} weeks", schedule.weeks.len());
            Ok(ScheduleOutcome::Complete(schedule))
        } else {
            warn!(
                "Generated {} weeks; {} units under quota",
                schedule.weeks.len(),
                plan.under_quota.len()
            );
            Ok(ScheduleOutcome::Partial {
                schedule,
                under_quota: plan.under_quota,
            })
        }
    }
}

fn validate_request(request: &ScheduleRequest) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for unit in &request.units {
        if !seen.insert(unit) {
            return Err(SeasonError::DuplicateUnit { unit: unit.clone() }.into());
        }
    }
    if request.lead_nights_in_division > request.lead_nights_per_unit {
        return Err(SeasonError::ConfigurationError {
            message: "In-division lead nights cannot exceed lead nights per unit".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Week modes for the lead matchups. In round mode the second matchup of a
/// week is oriented so its leads share as little history as possible with
/// the first matchup's leads on the same side.
fn pack_matchups(matchups: &[Matchup], mode: ScheduleMode, history: &TeammateHistory) -> Vec<WeekMode> {
    match mode {
        ScheduleMode::FullWeeks => matchups
            .iter()
            .map(|m| WeekMode::Normal {
                leads: SideLeads::new(Some(m.a.clone()), Some(m.b.clone())),
            })
            .collect(),
        ScheduleMode::Rounds => matchups
            .chunks(2)
            .map(|chunk| {
                let first = &chunk[0];
                // a unit leading both rounds stays on one side
                let keeps_sides = |m: &Matchup| m.a != first.b && m.b != first.a;
                let second = chunk.get(1).map(|m| {
                    let swapped = m.swapped();
                    match (keeps_sides(m), keeps_sides(&swapped)) {
                        (true, false) => m.clone(),
                        (false, _) => swapped,
                        (true, true) => {
                            let straight =
                                history.count(&first.a, &m.a) + history.count(&first.b, &m.b);
                            let crossed =
                                history.count(&first.a, &m.b) + history.count(&first.b, &m.a);
                            if crossed < straight {
                                swapped
                            } else {
                                m.clone()
                            }
                        }
                    }
                });
                WeekMode::SingleRoundLeads {
                    rounds: [
                        SideLeads::new(Some(first.a.clone()), Some(first.b.clone())),
                        match second {
                            Some(m) => SideLeads::new(Some(m.a), Some(m.b)),
                            None => SideLeads::default(),
                        },
                    ],
                }
            })
            .collect(),
    }
}

/// Leads go to their sides; every other unit joins the side it has shared
/// fewer weeks with, then the smaller side, then side A
fn assign_sides<R: Rng + ?Sized>(
    units: &[UnitId],
    mode: &WeekMode,
    history: &TeammateHistory,
    rng: &mut R,
) -> (Vec<UnitId>, Vec<UnitId>) {
    let mut team_a: Vec<UnitId> = Vec::new();
    let mut team_b: Vec<UnitId> = Vec::new();
    for side in Side::BOTH {
        for lead in mode.leads_for(side) {
            let team = match side {
                Side::A => &mut team_a,
                Side::B => &mut team_b,
            };
            if !team.contains(lead) {
                team.push(lead.clone());
            }
        }
    }

    let mut others: Vec<&UnitId> = units
        .iter()
        .filter(|u| !team_a.contains(u) && !team_b.contains(u))
        .collect();
    others.shuffle(rng);

    for unit in others {
        let with_a = history.total_with(unit, &team_a);
        let with_b = history.total_with(unit, &team_b);
        let to_a = match with_a.cmp(&with_b) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => team_a.len() <= team_b.len(),
        };
        if to_a {
            team_a.push(unit.clone());
        } else {
            team_b.push(unit.clone());
        }
    }

    (team_a, team_b)
}

/// Uniform random map, flip and winner
fn simulate_round<R: Rng + ?Sized>(maps: &[String], rng: &mut R) -> RoundResult {
    let map = maps.choose(rng).cloned();
    let flipped = rng.gen_bool(0.5);
    let winner = if rng.gen_bool(0.5) { Side::A } else { Side::B };
    RoundResult {
        winner: Some(winner),
        map,
        flipped,
    }
}
