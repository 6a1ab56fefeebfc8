use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rota_backend::{
    allocate, AllocationConfig, AvailabilityResponse, HistoricalShift, ShiftOverride, Volunteer,
};
use rota_backend::criteria::{MaleBalance, NoDoubleShifts, ShiftSize, ShiftSpread, TeamLead};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "rota", about = "Run the greedy volunteer rota allocator against a scenario file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Allocate a rota from a scenario JSON file and print the result.
    Run {
        /// Path to a scenario JSON file.
        scenario: PathBuf,

        /// Pretty-print the resulting JSON.
        #[arg(long)]
        pretty: bool,
    },
}

/// The on-disk shape of a scenario file: everything [`AllocationConfig`] needs,
/// plus the tunable weights, in a form `serde_json` can deserialize directly.
#[derive(Deserialize)]
struct Scenario {
    volunteers: Vec<Volunteer>,
    availability: Vec<AvailabilityResponse>,
    shift_dates: Vec<NaiveDate>,
    default_shift_size: u32,
    #[serde(default)]
    overrides: Vec<ShiftOverride>,
    #[serde(default)]
    historical_shifts: Vec<HistoricalShift>,
    #[serde(default = "default_max_allocation_frequency")]
    max_allocation_frequency: f64,
    #[serde(default)]
    weights: Weights,
}

#[derive(Deserialize)]
struct Weights {
    #[serde(default = "default_weight")]
    current_rota_urgency: f64,
    #[serde(default = "default_weight")]
    overall_frequency_fairness: f64,
    #[serde(default = "default_weight")]
    promote_group: f64,
    #[serde(default)]
    team_lead: CriterionWeights,
    #[serde(default)]
    male_balance: CriterionWeights,
    #[serde(default)]
    shift_size: CriterionWeights,
    #[serde(default)]
    shift_spread: CriterionWeights,
    #[serde(default)]
    no_double_shifts: CriterionWeights,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            current_rota_urgency: default_weight(),
            overall_frequency_fairness: default_weight(),
            promote_group: default_weight(),
            team_lead: CriterionWeights::default(),
            male_balance: CriterionWeights::default(),
            shift_size: CriterionWeights::default(),
            shift_spread: CriterionWeights::default(),
            no_double_shifts: CriterionWeights::default(),
        }
    }
}

#[derive(Deserialize, Default, Clone, Copy)]
struct CriterionWeights {
    group: Option<f64>,
    affinity: Option<f64>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_max_allocation_frequency() -> f64 {
    1.0
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { scenario, pretty } => run(scenario, pretty),
    }
}

fn run(scenario_path: PathBuf, pretty: bool) -> Result<()> {
    let raw = fs::read_to_string(&scenario_path)
        .with_context(|| format!("reading scenario file {}", scenario_path.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario file {}", scenario_path.display()))?;

    let config = build_config(scenario);

    let outcome = allocate(config).context("allocation failed")?;

    let json = if pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{json}");

    if !outcome.success {
        log::warn!("rota has {} unresolved validation error(s)", outcome.validation_errors.len());
        std::process::exit(1);
    }

    Ok(())
}

fn build_config(scenario: Scenario) -> AllocationConfig {
    let w = scenario.weights;

    AllocationConfig {
        criteria: vec![
            Box::new(TeamLead::new(
                w.team_lead.group.unwrap_or(1.0),
                w.team_lead.affinity.unwrap_or(1.0),
            )),
            Box::new(MaleBalance::new(
                w.male_balance.group.unwrap_or(0.5),
                w.male_balance.affinity.unwrap_or(1.0),
            )),
            Box::new(ShiftSize::new(
                w.shift_size.group.unwrap_or(0.0),
                w.shift_size.affinity.unwrap_or(1.0),
            )),
            Box::new(ShiftSpread::new(
                w.shift_spread.group.unwrap_or(0.0),
                w.shift_spread.affinity.unwrap_or(0.5),
            )),
            Box::new(NoDoubleShifts::new(
                w.no_double_shifts.group.unwrap_or(0.0),
                w.no_double_shifts.affinity.unwrap_or(1.0),
            )),
        ],
        max_allocation_frequency: scenario.max_allocation_frequency,
        historical_shifts: scenario.historical_shifts,
        volunteers: scenario.volunteers,
        availability: scenario.availability,
        shift_dates: scenario.shift_dates,
        default_shift_size: scenario.default_shift_size,
        overrides: scenario.overrides,
        weight_current_rota_urgency: w.current_rota_urgency,
        weight_overall_frequency_fairness: w.overall_frequency_fairness,
        weight_promote_group: w.promote_group,
    }
}
