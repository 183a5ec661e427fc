//! Season builders shared by the integration tests

#![allow(dead_code)]

use season_balance::types::{Round, RoundResult, Side, SideLeads, Unit, UnitId, Week, WeekMode};
use season_balance::Season;
use std::collections::BTreeMap;

pub fn names(units: &[&str]) -> Vec<UnitId> {
    units.iter().map(|u| u.to_string()).collect()
}

/// Round won by `side` on `map`
pub fn won(side: Side, map: Option<&str>) -> RoundResult {
    RoundResult {
        winner: Some(side),
        map: map.map(str::to_string),
        flipped: false,
    }
}

/// Week with the first unit of each team as lead and both results recorded
pub fn played_week(season: &Season, team_a: &[&str], team_b: &[&str], results: [RoundResult; 2]) -> Week {
    let [first, second] = results;
    Week::new(format!("Week {}", season.weeks.len() + 1), season.maps.snapshot())
        .with_teams(names(team_a), names(team_b))
        .expect("disjoint rosters")
        .with_mode(WeekMode::Normal {
            leads: SideLeads::new(
                team_a.first().map(|u| u.to_string()),
                team_b.first().map(|u| u.to_string()),
            ),
        })
        .with_round(Round::First, first)
        .with_round(Round::Second, second)
}

/// Six-unit season split over two divisions with three recorded weeks
pub fn league_season() -> Season {
    let mut season = Season::default();
    season.add_division("Army of the Potomac").unwrap();
    season.add_division("Army of Northern Virginia").unwrap();

    let roster = [
        ("69th NY", 20, 30, "Army of the Potomac"),
        ("20th Maine", 25, 35, "Army of the Potomac"),
        ("1st Minnesota", 15, 20, "Army of the Potomac"),
        ("1st Texas", 30, 40, "Army of Northern Virginia"),
        ("Stonewall", 20, 25, "Army of Northern Virginia"),
        ("2nd SC", 10, 15, "Army of Northern Virginia"),
    ];
    for (name, min, max, division) in roster {
        season
            .add_unit(Unit::new(name).with_players(min, max).in_division(division))
            .unwrap();
    }

    let weeks = [
        (
            ["69th NY", "20th Maine", "1st Minnesota"],
            ["1st Texas", "Stonewall", "2nd SC"],
            [won(Side::A, Some("Bloody Lane")), won(Side::A, Some("Pry Grist Mill"))],
        ),
        (
            ["1st Texas", "69th NY", "2nd SC"],
            ["20th Maine", "Stonewall", "1st Minnesota"],
            [won(Side::B, Some("Bloody Lane")), won(Side::A, Some("Hagerstown Turnpike"))],
        ),
        (
            ["Stonewall", "20th Maine", "2nd SC"],
            ["1st Minnesota", "1st Texas", "69th NY"],
            [won(Side::B, Some("Pry Grist Mill")), won(Side::B, Some("Bloody Lane"))],
        ),
    ];
    for (team_a, team_b, results) in weeks {
        let week = played_week(&season, &team_a, &team_b, results);
        season.push_week(week).unwrap();
    }

    season
}

/// Two single-unit teams with headcounts recorded on the week
pub fn duel_season(results: [RoundResult; 2]) -> Season {
    let mut season = Season::default();
    season.add_unit(Unit::new("Alpha").with_players(20, 20)).unwrap();
    season.add_unit(Unit::new("Bravo").with_players(20, 20)).unwrap();
    let week = played_week(&season, &["Alpha"], &["Bravo"], results);
    season.push_week(week).unwrap();
    season
}

/// Headcount ranges for a plain balancing request
pub fn uniform_counts(units: &[&str], min: u32, max: u32) -> BTreeMap<UnitId, season_balance::PlayerRange> {
    units
        .iter()
        .map(|u| (u.to_string(), season_balance::PlayerRange::new(min, max)))
        .collect()
}
