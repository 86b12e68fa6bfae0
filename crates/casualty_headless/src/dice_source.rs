//! Seeded random source for headless runs.

use casualty_core::error::{CasualtyError, Result};
use casualty_core::random::RandomSource;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// ChaCha8-backed source; the same seed yields the same draws on every platform.
#[derive(Debug, Clone)]
pub struct ChaChaRandomSource {
    rng: ChaCha8Rng,
    seed: u64,
}

impl ChaChaRandomSource {
    /// Source seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this source was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for ChaChaRandomSource {
    fn random_indices(&mut self, bound: u32, count: u32, label: &str) -> Result<Vec<u32>> {
        if bound == 0 {
            return Err(CasualtyError::RandomSource(format!(
                "cannot draw from an empty range for '{label}'"
            )));
        }
        tracing::trace!(bound, count, label, "Random draw");
        Ok((0..count).map(|_| self.rng.gen_range(0..bound)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = ChaChaRandomSource::seeded(42);
        let mut b = ChaChaRandomSource::seeded(42);
        let first = a.random_indices(6, 20, "test").unwrap();
        assert_eq!(first, b.random_indices(6, 20, "test").unwrap());
        assert!(first.iter().all(|&v| v < 6));
    }

    #[test]
    fn test_empty_range_rejected() {
        let mut source = ChaChaRandomSource::seeded(1);
        assert!(source.random_indices(0, 1, "empty").is_err());
    }
}
