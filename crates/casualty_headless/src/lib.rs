//! Headless casualty resolver for scenario runs and CI verification.
//!
//! This crate resolves scenario battles without any UI. This enables:
//!
//! - **Scenario runs**: Resolve battles with a seeded dice source
//! - **Replay verification**: Re-run a scenario against a recorded dice log
//! - **CI verification**: Check that repeated runs produce identical results
//!
//! # Output
//!
//! - **stdout**: Reports as JSON
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Resolve a scenario and record the dice
//! cargo run -p casualty_headless -- resolve --scenario scenarios/classic.ron --record dice.bin
//!
//! # Replay it
//! cargo run -p casualty_headless -- replay --scenario scenarios/classic.ron --log dice.bin
//!
//! # Verify determinism
//! cargo run -p casualty_headless -- verify --scenario scenarios/classic.ron --runs 8
//! ```

pub mod dice_source;
pub mod runner;
pub mod scenario;
pub mod verify;

pub use dice_source::ChaChaRandomSource;
pub use runner::{run_scenario, BattleReport, BattleRunner, RankedUnit, RoundReport, ScenarioReport};
pub use scenario::{BattleKind, BattleSetup, Scenario, ScenarioError, UnitPlacement};
pub use verify::{verify_scenario, VerifyReport};
