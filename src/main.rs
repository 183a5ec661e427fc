//! Command-line entry point for the season engines
//!
//! Loads configuration and a season file, runs one engine and prints its
//! result as JSON on stdout. Logs go to stderr.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use season_balance::balance::TeamBalancer;
use season_balance::config::AppConfig;
use season_balance::probability::{MatchupQuery, WinProbabilityEstimator};
use season_balance::schedule::{ScheduleMode, ScheduleRequest, ScheduleSimulator};
use season_balance::season::{Season, TeammateHistory};
use season_balance::standings::{Standings, StandingsOrder};
use season_balance::types::{PlayerRange, UnitId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Season Balance - ratings, probabilities, balancing and scheduling
#[derive(Parser)]
#[command(
    name = "season-balance",
    version,
    about = "Ratings, win probabilities, team balancing and schedules for a unit league season",
    long_about = "Season Balance folds a recorded season into weighted Elo ratings and standings, \
                 estimates win probabilities from ratings and map history, splits units into two \
                 balanced teams and generates lead-night schedules."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Season file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to the season file (JSON format)"
    )]
    season: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Standings as of a week
    Standings {
        /// Week number (1-based); defaults to the latest week
        #[arg(long, value_name = "N")]
        week: Option<usize>,
        /// Rank by rating instead of points
        #[arg(long)]
        by_rating: bool,
        /// Group the table by division
        #[arg(long)]
        grouped: bool,
    },
    /// Win probability of one matchup
    Estimate {
        #[arg(long, value_delimiter = ',', required = true)]
        team_a: Vec<UnitId>,
        #[arg(long, value_delimiter = ',', required = true)]
        team_b: Vec<UnitId>,
        #[arg(long)]
        map: Option<String>,
        /// Team B plays the Union
        #[arg(long)]
        flipped: bool,
        /// Week number (1-based) being estimated; defaults to the next week
        #[arg(long, value_name = "N")]
        before_week: Option<usize>,
    },
    /// Split available units into two balanced teams
    Balance {
        /// Week number (1-based) supplying availability and headcounts
        #[arg(long, value_name = "N")]
        week: Option<usize>,
        /// Maximum allowed difference between the team ranges
        #[arg(long, value_name = "N")]
        max_diff: Option<u32>,
        /// Units that must face each other, as A:B
        #[arg(long, value_name = "A:B", value_parser = parse_pair)]
        oppose: Vec<(UnitId, UnitId)>,
    },
    /// Generate lead-night weeks for the token units
    Schedule {
        #[arg(long, value_name = "N")]
        lead_nights: Option<u32>,
        #[arg(long, value_name = "N")]
        in_division: Option<u32>,
        /// Two matchups per week, one per round
        #[arg(long)]
        rounds: bool,
        /// Fill in random maps and winners
        #[arg(long)]
        simulate: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate configuration and season, then exit
    Validate,
}

fn parse_pair(raw: &str) -> std::result::Result<(UnitId, UnitId), String> {
    match raw.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(format!("expected A:B, got '{}'", raw)),
    }
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    Ok(config)
}

fn load_season(path: Option<&Path>) -> Result<Season> {
    let Some(path) = path else {
        warn!("No season file given, using an empty season");
        return Ok(Season::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read season file {}", path.display()))?;
    let season: Season = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse season file {}", path.display()))?;
    info!(
        "Loaded season: {} units, {} weeks, {} divisions",
        season.units.len(),
        season.weeks.len(),
        season.divisions.len()
    );
    Ok(season)
}

/// Convert a 1-based week number into an index
fn week_index(week: usize) -> Result<usize> {
    week.checked_sub(1)
        .ok_or_else(|| anyhow!("Week numbers start at 1"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: &AppConfig, season: &Season) -> Result<()> {
    match command {
        Command::Standings {
            week,
            by_rating,
            grouped,
        } => {
            let standings = Standings::new(config.elo.clone(), config.points.clone())?;
            let index = match week {
                Some(week) => week_index(week)?,
                None => season.weeks.len().saturating_sub(1),
            };
            let order = if by_rating {
                StandingsOrder::Rating
            } else {
                StandingsOrder::Points
            };
            if grouped {
                print_json(&standings.grouped(season, index, order)?)
            } else {
                print_json(&standings.compute(season, index, order)?)
            }
        }

        Command::Estimate {
            team_a,
            team_b,
            map,
            flipped,
            before_week,
        } => {
            let estimator =
                WinProbabilityEstimator::new(config.elo.clone(), config.probability.clone())?;
            let before_week = match before_week {
                Some(week) => week_index(week)?,
                None => season.weeks.len(),
            };
            let query = MatchupQuery {
                team_a,
                team_b,
                map,
                flipped,
                before_week,
            };
            print_json(&estimator.estimate(season, &query)?)
        }

        Command::Balance {
            week,
            max_diff,
            oppose,
        } => {
            let balancer = TeamBalancer::new(config.balancer.clone())?;
            let fallback_count = config.elo.default_player_count.round() as u32;
            let fallback = PlayerRange::new(fallback_count, fallback_count);

            let (available, counts, history) = match week {
                Some(week) => {
                    let index = week_index(week)?;
                    let week = season
                        .weeks
                        .get(index)
                        .ok_or_else(|| anyhow!("Season has no week {}", index + 1))?;
                    (
                        season.available_units(week.id)?,
                        season.balancer_counts(week.id, fallback)?,
                        TeammateHistory::teammates(season.weeks_before(index)),
                    )
                }
                None => {
                    let mut counts = season.roster_player_counts();
                    for unit in season.unit_names() {
                        counts.entry(unit).or_insert(fallback);
                    }
                    (
                        season.unit_names(),
                        counts,
                        TeammateHistory::teammates(&season.weeks),
                    )
                }
            };

            let mut request = balancer.request(available, counts);
            if max_diff.is_some() {
                request = request.with_max_player_diff(max_diff);
            }
            for (a, b) in oppose {
                request = request.with_opposing_pair(a, b);
            }

            let outcome = balancer.balance(&request, &history, &season.division_map())?;
            if !outcome.is_balanced() {
                warn!("No split within the allowed player difference");
            }
            print_json(&outcome)
        }

        Command::Schedule {
            lead_nights,
            in_division,
            rounds,
            simulate,
            seed,
        } => {
            let simulator = ScheduleSimulator::new(config.schedule.clone())?;
            let mut request = ScheduleRequest::new(season.token_units(), &config.schedule);
            request.divisions = season.division_map();
            if let Some(n) = lead_nights {
                request.lead_nights_per_unit = n;
            }
            if let Some(n) = in_division {
                request.lead_nights_in_division = n;
            }
            if rounds {
                request.mode = ScheduleMode::Rounds;
            }
            request.simulate = simulate;
            request.week_offset = season.weeks.len();

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let history = TeammateHistory::teammates(&season.weeks);
            let outcome = simulator.generate(&request, &history, &season.maps, &mut rng)?;
            if !outcome.is_complete() {
                warn!("Schedule left some units under their lead quota");
            }
            print_json(&outcome)
        }

        Command::Validate => {
            for week in &season.weeks {
                season_balance::types::validate_rosters(&week.team_a, &week.team_b)
                    .with_context(|| format!("Invalid rosters in {}", week.name))?;
            }
            info!("Configuration and season are valid");
            print_json(config)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    debug!("Running {} v{}", config.service.name, season_balance::VERSION);

    let season = load_season(args.season.as_deref())?;
    run(args.command, &config, &season)
}
