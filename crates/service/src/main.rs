//! eclipse-guardian - power-path anomaly monitor
//!
//! Runs the 1 ms monitoring loop and provides model and scoring tools.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eclipse_guardian_service::DEFAULT_CONFIG_FILE;
use eclipse_guardian_service::prelude::*;
use guardian_detect::{AnomalyScorer, GuardRails};
use guardian_fdir::{PowerActuator, SoftwareActuator, SystemClock};
use guardian_scheduler::CadenceScheduler;
use guardian_telemetry::{FeatureVector, NUM_FEATURES};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eclipse-guardian")]
#[command(about = "Eclipse Guardian - power-path anomaly detection and recovery")]
#[command(version)]
#[command(long_about = "
eclipse-guardian watches a regulated power path at 1 ms cadence, scores
windowed features with a quantized isolation forest plus guard-rail rules,
and cuts, holds, restarts and verifies power when a latch-up signature
persists.

Use --json for machine-readable output of score and check-model.
")]
struct Cli {
    /// Configuration file (YAML); defaults apply when it does not exist
    #[arg(
        long,
        global = true,
        env = "ECLIPSE_GUARDIAN_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    /// Model file (JSON), overriding model_path from the config
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring loop
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Score one feature vector
    Score {
        /// di_dt,vout_droop,ripple_rms,efficiency,deff_dt
        #[arg(allow_hyphen_values = true)]
        features: String,
    },

    /// Load and validate a model file
    CheckModel,

    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            let code = e
                .downcast_ref::<ServiceError>()
                .map_or(1, ServiceError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run { max_ticks } => run(cli, *max_ticks),
        Commands::Score { features } => score(cli, features),
        Commands::CheckModel => check_model(cli),
        Commands::Config => print_config(cli),
    }
}

fn load_config(cli: &Cli) -> Result<GuardianConfig> {
    let config = GuardianConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    Ok(config.with_model_override(cli.model.clone()))
}

fn load_scorer(config: &GuardianConfig) -> Result<AnomalyScorer> {
    let path = config.model_path()?;
    AnomalyScorer::load(path, config.detection.fallback_threshold)
        .map_err(ServiceError::from)
        .with_context(|| format!("Failed to load model {}", path.display()))
}

fn run(cli: &Cli, max_ticks: Option<u64>) -> Result<()> {
    let config = load_config(cli)?;

    let mut actuator = SoftwareActuator::new();
    actuator
        .init()
        .map_err(ServiceError::from)
        .context("Power actuator initialization failed")?;

    let scorer = load_scorer(&config)?;
    let threshold = scorer.threshold();
    if !cli.json {
        println!(
            "IF threshold = {:.6} ; loop hop = {} ms",
            threshold.value(),
            config.sampling.hop_ms
        );
    }
    info!(
        threshold = threshold.value(),
        source = %threshold.source(),
        hop_ms = config.sampling.hop_ms,
        "Monitor starting"
    );

    let mut scheduler = CadenceScheduler::new(config.hop())
        .map_err(ServiceError::from)?
        .with_max_jitter(config.max_jitter());
    let setup = config.rt_setup();
    if setup.has_rt_features() {
        scheduler.apply_rt_setup(&setup);
    }

    let source = NominalSource::new(config.sampling.use_ripple);
    let mut controller = GuardianController::new(&config, scorer, source, actuator)?;
    let clock = SystemClock::new();
    let summary = run_loop(&mut controller, &mut scheduler, &clock, max_ticks)?;

    output::print_run_summary(&summary, cli.json);
    Ok(())
}

fn score(cli: &Cli, features: &str) -> Result<()> {
    let features = parse_features(features)?;
    let config = load_config(cli)?;
    let scorer = load_scorer(&config)?;
    let rules = GuardRails::new(config.guard_rail_config()).map_err(ServiceError::from)?;

    let verdict = scorer.classify(&features);
    let rule_hit = rules.evaluate(&features);
    output::print_score(&features, &verdict, scorer.threshold(), rule_hit, cli.json);
    Ok(())
}

fn check_model(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let scorer = load_scorer(&config)?;
    let path = config.model_path()?;
    output::print_model_summary(path, &scorer.summary(), cli.json);
    Ok(())
}

fn print_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to format config as JSON")?
        );
    } else {
        print!("{}", config.to_yaml()?);
    }
    Ok(())
}

/// Parse `a,b,c,d,e` into a feature vector in model order.
fn parse_features(input: &str) -> Result<FeatureVector, ServiceError> {
    let values = input
        .split(',')
        .map(|v| {
            let v = v.trim();
            v.parse::<f32>()
                .map_err(|err| ServiceError::invalid_input(format!("`{v}` is not a number: {err}")))
        })
        .collect::<Result<Vec<f32>, _>>()?;

    let array: [f32; NUM_FEATURES] = values.try_into().map_err(|v: Vec<f32>| {
        ServiceError::invalid_input(format!(
            "exactly {NUM_FEATURES} values required, got {}",
            v.len()
        ))
    })?;
    if array.iter().any(|v| !v.is_finite()) {
        return Err(ServiceError::invalid_input("feature values must be finite"));
    }
    Ok(FeatureVector::from_array(array))
}
