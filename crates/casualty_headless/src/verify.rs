//! Determinism verification.
//!
//! Resolves the same scenario with the same seed several times on a rayon
//! pool. All runs share the process-wide ranking cache, so a stale or
//! racy cache entry shows up as a hash mismatch.

use casualty_core::decision::DefaultCasualtyDecider;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dice_source::ChaChaRandomSource;
use crate::runner::run_scenario;
use crate::scenario::{Scenario, ScenarioError};

/// Result of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Scenario name.
    pub scenario: String,
    /// Seed used by every run.
    pub seed: u64,
    /// Outcome hash of each run.
    pub hashes: Vec<u64>,
    /// Whether every run produced the same hash.
    pub deterministic: bool,
}

/// Resolve `scenario` `runs` times in parallel with `seed`.
pub fn verify_scenario(
    scenario: &Scenario,
    seed: u64,
    runs: usize,
) -> Result<VerifyReport, ScenarioError> {
    let data = scenario.build_game_data()?;

    let hashes = (0..runs)
        .into_par_iter()
        .map(|run| {
            let mut random = ChaChaRandomSource::seeded(seed);
            let report = run_scenario(scenario, &data, &mut random, &mut DefaultCasualtyDecider, Some(seed))?;
            tracing::debug!(run, hash = report.state_hash(), "Verification run complete");
            Ok(report.state_hash())
        })
        .collect::<Result<Vec<u64>, ScenarioError>>()?;

    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !deterministic {
        tracing::error!(scenario = %scenario.name, seed, ?hashes, "Non-deterministic casualty resolution");
    }

    Ok(VerifyReport {
        scenario: scenario.name.clone(),
        seed,
        hashes,
        deterministic,
    })
}
