//! Determinism testing utilities.
//!
//! Provides a harness for verifying that casualty selection
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every peer in a networked game resolves casualties locally and must
//! reach the same answer. Sources of non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Rankings iterate the pool in instance order, never over hash maps.
//!
//! - **Shared cache state**: The order-of-losses cache is process-wide.
//!   A cached ranking must equal a fresh one unit for unit.
//!
//! - **Random draws**: All randomness goes through a `RandomSource`; tests
//!   use scripted or seeded sources.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual ranking and selection steps
//! 2. **Property tests**: Random pools must still rank deterministically
//! 3. **Integration tests**: Multi-round battles are reproducible
//! 4. **Parallel tests**: Running N resolutions in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of rounds resolved per run.
    pub rounds: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic resolution).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that resolution was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Casualty resolution is non-deterministic!\n\
                 Runs: {}\n\
                 Rounds: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a resolution multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `rounds` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to resolve one round
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use casualty_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    rounds: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..rounds {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Run N resolutions on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up when several threads share
/// the process-wide ranking cache.
pub fn verify_parallel_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    rounds: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S + Sync,
    Step: Fn(&mut S) + Sync,
    HashFn: Fn(&S) -> u64 + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| {
                s.spawn(|| {
                    let mut state = setup();
                    for _ in 0..rounds {
                        step(&mut state);
                    }
                    hash(&state)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for ranking and selection tests.
///
/// These strategies generate random but reproducible pools for
/// property-based testing.
pub mod strategies {
    use casualty_core::game_data::GameData;
    use casualty_core::unit::{PlayerId, Unit, UnitId, UnitTypeId};
    use proptest::prelude::*;

    /// Shape of one generated unit.
    #[derive(Debug, Clone)]
    pub struct UnitSpec {
        /// Index into the type list handed to [`build_pool`].
        pub type_index: usize,
        /// Take one hit if the type has more than one hit point.
        pub damaged: bool,
        /// Movement remaining.
        pub movement_left: u32,
        /// Landed from the sea.
        pub amphibious: bool,
    }

    /// Generate one unit over `type_count` types.
    pub fn arb_unit_spec(type_count: usize) -> impl Strategy<Value = UnitSpec> {
        (0..type_count.max(1), any::<bool>(), 0u32..3, any::<bool>()).prop_map(
            |(type_index, damaged, movement_left, amphibious)| UnitSpec {
                type_index,
                damaged,
                movement_left,
                amphibious,
            },
        )
    }

    /// Generate a non-empty pool of up to `max_len - 1` units.
    pub fn arb_pool_specs(type_count: usize, max_len: usize) -> impl Strategy<Value = Vec<UnitSpec>> {
        proptest::collection::vec(arb_unit_spec(type_count), 1..max_len.max(2))
    }

    /// Generate a first unit id, for relabelling pools.
    pub fn arb_first_id() -> impl Strategy<Value = u64> {
        1u64..100_000
    }

    /// Generate a hit count (0-12).
    pub fn arb_hits() -> impl Strategy<Value = u32> {
        0u32..12
    }

    /// Turn specs into units owned by `owner` with consecutive ids.
    #[must_use]
    pub fn build_pool(
        data: &GameData,
        types: &[UnitTypeId],
        specs: &[UnitSpec],
        owner: PlayerId,
        first_id: u64,
    ) -> Vec<Unit> {
        specs
            .iter()
            .zip(first_id..)
            .filter_map(|(spec, id)| {
                let unit_type = *types.get(spec.type_index)?;
                let multi_hit = data
                    .unit_type(unit_type)
                    .is_ok_and(|unit_type| unit_type.hit_points > 1);
                let mut unit = Unit::new(UnitId(id), owner, unit_type)
                    .with_movement_left(spec.movement_left)
                    .with_hits(u32::from(spec.damaged && multi_hit));
                unit.was_amphibious = spec.amphibious;
                Some(unit)
            })
            .collect()
    }
}
