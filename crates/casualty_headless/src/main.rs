//! Headless casualty resolver.
//!
//! This binary resolves scenario battles without a UI.
//! Designed for CI testing, dice-log replay and determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a scenario with a seed, recording the dice
//! cargo run -p casualty_headless -- resolve --scenario scenarios/classic.ron --seed 7 --record dice.bin
//!
//! # Replay the recorded dice and compare with a saved report
//! cargo run -p casualty_headless -- replay --scenario scenarios/classic.ron --log dice.bin --expected report.json
//!
//! # Print the order of losses for one battle
//! cargo run -p casualty_headless -- rank --scenario scenarios/classic.ron --battle beachhead
//!
//! # Verify determinism
//! cargo run -p casualty_headless -- verify --scenario scenarios/classic.ron --seed 12345 --runs 8
//! ```
//!
//! # Output
//!
//! Reports (stdout): JSON
//! Logs (stderr): Debug information

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casualty_core::decision::DefaultCasualtyDecider;
use casualty_core::random::{DiceLog, RecordingRandomSource, ReplayRandomSource};
use casualty_headless::{
    run_scenario, verify_scenario, BattleRunner, ChaChaRandomSource, Scenario, ScenarioError,
    ScenarioReport,
};

#[derive(Parser)]
#[command(name = "casualty_headless")]
#[command(about = "Headless casualty resolver for scenario runs and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every battle of a scenario once
    Resolve {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Record the dice to this file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-run a scenario against a recorded dice log
    Replay {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Dice log file
        #[arg(short, long)]
        log: PathBuf,

        /// Report to compare against
        #[arg(long)]
        expected: Option<PathBuf>,
    },

    /// Print the order of losses for a battle's targets
    Rank {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Battle name (default: every battle)
        #[arg(short, long)]
        battle: Option<String>,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Commands::Resolve {
            scenario,
            seed,
            record,
            output,
        } => cmd_resolve(&scenario, seed, record.as_deref(), output.as_deref()),
        Commands::Replay {
            scenario,
            log,
            expected,
        } => cmd_replay(&scenario, &log, expected.as_deref()),
        Commands::Rank { scenario, battle } => cmd_rank(&scenario, battle.as_deref()),
        Commands::Verify {
            scenario,
            seed,
            runs,
        } => cmd_verify(&scenario, seed, runs),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }
}

/// Resolve a scenario once
fn cmd_resolve(
    path: &Path,
    seed: u64,
    record: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(path)?;
    let data = scenario.build_game_data()?;
    tracing::info!(scenario = %scenario.name, seed, battles = scenario.battles.len(), "Resolving scenario");

    let mut random = RecordingRandomSource::new(ChaChaRandomSource::seeded(seed), Some(seed));
    let report = run_scenario(&scenario, &data, &mut random, &mut DefaultCasualtyDecider, Some(seed))?;

    if let Some(record) = record {
        let log = random.into_log();
        log.save(record)?;
        tracing::info!(draws = log.len(), path = %record.display(), "Dice log saved");
    }

    match output {
        Some(output) => {
            std::fs::write(output, serde_json::to_string_pretty(&report)?)?;
            tracing::info!(path = %output.display(), "Report saved");
            Ok(())
        }
        None => print_json(&report),
    }
}

/// Replay a recorded dice log
fn cmd_replay(path: &Path, log: &Path, expected: Option<&Path>) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(path)?;
    let data = scenario.build_game_data()?;
    let log = DiceLog::load(log)?;
    let seed = log.seed;
    tracing::info!(scenario = %scenario.name, draws = log.len(), "Replaying dice log");

    let mut random = ReplayRandomSource::new(log);
    let report = run_scenario(&scenario, &data, &mut random, &mut DefaultCasualtyDecider, seed)?;
    if random.remaining() > 0 {
        tracing::warn!(unused = random.remaining(), "Dice log has draws left over");
    }

    if let Some(expected) = expected {
        let expected: ScenarioReport = serde_json::from_str(&std::fs::read_to_string(expected)?)?;
        if expected.state_hash() != report.state_hash() {
            tracing::error!(
                expected = expected.state_hash(),
                actual = report.state_hash(),
                "Replay diverged from recorded report"
            );
            print_json(&report)?;
            std::process::exit(2);
        }
        tracing::info!(hash = report.state_hash(), "Replay matches recorded report");
    }

    print_json(&report)
}

/// Print the order of losses
fn cmd_rank(path: &Path, battle: Option<&str>) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(path)?;
    let data = scenario.build_game_data()?;
    let runner = BattleRunner::new(&data);

    let battles = match battle {
        Some(name) => vec![scenario.battle(name)?],
        None => scenario.battles.iter().collect(),
    };

    let mut ranked = serde_json::Map::new();
    for setup in battles {
        let order = runner.rank(setup)?;
        ranked.insert(setup.name.clone(), serde_json::to_value(order)?);
    }
    print_json(&ranked)
}

/// Verify determinism across repeated runs
fn cmd_verify(path: &Path, seed: u64, runs: usize) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(path)?;
    tracing::info!(scenario = %scenario.name, seed, runs, "Verifying determinism");

    let report = verify_scenario(&scenario, seed, runs)?;
    print_json(&report)?;

    if report.deterministic {
        tracing::info!(hash = report.hashes.first().copied().unwrap_or_default(), "Deterministic");
        Ok(())
    } else {
        eprintln!("FAILED: {} runs produced differing results", report.hashes.len());
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ScenarioError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
