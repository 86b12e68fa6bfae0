//! Bridge to the game's random number service.
//!
//! Casualty selection never rolls its own dice. When it needs random picks
//! it asks a [`RandomSource`] for one batch of indices per decision point,
//! in a fixed order, so every peer that replays the same draws reaches the
//! same result.
//!
//! [`RecordingRandomSource`] logs each draw into a [`DiceLog`], which can be
//! saved and later fed back through [`ReplayRandomSource`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CasualtyError, Result};

/// Source of random indices.
pub trait RandomSource {
    /// Draw `count` values, each in `0..bound`.
    ///
    /// `label` describes the purpose of the draw for logs and audits.
    ///
    /// # Errors
    ///
    /// Returns an error if the values cannot be produced.
    fn random_indices(&mut self, bound: u32, count: u32, label: &str) -> Result<Vec<u32>>;
}

/// One logged draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceLogEntry {
    /// Exclusive upper bound.
    pub bound: u32,
    /// Values requested.
    pub count: u32,
    /// Purpose of the draw.
    pub label: String,
    /// Values returned.
    pub values: Vec<u32>,
}

/// Dice log format version for compatibility.
pub const DICE_LOG_VERSION: u32 = 1;

/// Ordered record of every random draw made during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceLog {
    /// Log format version.
    pub version: u32,
    /// Seed of the source that produced the log, if any.
    pub seed: Option<u64>,
    /// Draws in request order.
    pub entries: Vec<DiceLogEntry>,
}

impl Default for DiceLog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DiceLog {
    /// Create an empty log.
    #[must_use]
    pub const fn new(seed: Option<u64>) -> Self {
        Self {
            version: DICE_LOG_VERSION,
            seed,
            entries: Vec::new(),
        }
    }

    /// Number of draws recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no draws were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save the log to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| CasualtyError::InvalidState(format!("Failed to serialize dice log: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| CasualtyError::InvalidState(format!("Failed to write dice log: {e}")))?;
        Ok(())
    }

    /// Load a log from a file.
    ///
    /// # Errors
    /// Returns an error if reading, deserialization or the version check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| CasualtyError::InvalidState(format!("Failed to read dice log: {e}")))?;
        let log: Self = bincode::deserialize(&bytes).map_err(|e| {
            CasualtyError::InvalidState(format!("Failed to deserialize dice log: {e}"))
        })?;

        if log.version != DICE_LOG_VERSION {
            return Err(CasualtyError::InvalidState(format!(
                "Dice log version mismatch: expected {}, got {}",
                DICE_LOG_VERSION, log.version
            )));
        }

        Ok(log)
    }
}

/// Wraps a source and records every draw.
#[derive(Debug)]
pub struct RecordingRandomSource<R> {
    inner: R,
    log: DiceLog,
}

impl<R: RandomSource> RecordingRandomSource<R> {
    /// Start recording draws from `inner`.
    pub const fn new(inner: R, seed: Option<u64>) -> Self {
        Self {
            inner,
            log: DiceLog::new(seed),
        }
    }

    /// Draws recorded so far.
    #[must_use]
    pub const fn log(&self) -> &DiceLog {
        &self.log
    }

    /// Stop recording and return the log.
    #[must_use]
    pub fn into_log(self) -> DiceLog {
        self.log
    }
}

impl<R: RandomSource> RandomSource for RecordingRandomSource<R> {
    fn random_indices(&mut self, bound: u32, count: u32, label: &str) -> Result<Vec<u32>> {
        let values = self.inner.random_indices(bound, count, label)?;
        self.log.entries.push(DiceLogEntry {
            bound,
            count,
            label: label.to_string(),
            values: values.clone(),
        });
        Ok(values)
    }
}

/// Replays a recorded log, failing as soon as a request diverges.
#[derive(Debug)]
pub struct ReplayRandomSource {
    log: DiceLog,
    next: usize,
}

impl ReplayRandomSource {
    /// Replay `log` from the first draw.
    #[must_use]
    pub const fn new(log: DiceLog) -> Self {
        Self { log, next: 0 }
    }

    /// Draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.log.entries.len().saturating_sub(self.next)
    }
}

impl RandomSource for ReplayRandomSource {
    fn random_indices(&mut self, bound: u32, count: u32, label: &str) -> Result<Vec<u32>> {
        let index = self.next;
        let entry = self
            .log
            .entries
            .get(index)
            .ok_or_else(|| CasualtyError::DiceLogMismatch {
                index,
                message: format!("log exhausted, wanted '{label}'"),
            })?;
        if entry.bound != bound || entry.count != count {
            return Err(CasualtyError::DiceLogMismatch {
                index,
                message: format!(
                    "requested {count} in 0..{bound}, logged {} in 0..{}",
                    entry.count, entry.bound
                ),
            });
        }
        self.next += 1;
        Ok(entry.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting(u32);

    impl RandomSource for Counting {
        fn random_indices(&mut self, bound: u32, count: u32, _label: &str) -> Result<Vec<u32>> {
            let values = (0..count).map(|i| (self.0 + i) % bound).collect();
            self.0 += count;
            Ok(values)
        }
    }

    #[test]
    fn test_record_then_replay() {
        let mut recording = RecordingRandomSource::new(Counting(0), Some(7));
        let first = recording.random_indices(10, 3, "aa").unwrap();
        let second = recording.random_indices(4, 2, "low luck").unwrap();
        let log = recording.into_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log.seed, Some(7));

        let mut replay = ReplayRandomSource::new(log);
        assert_eq!(replay.random_indices(10, 3, "aa").unwrap(), first);
        assert_eq!(replay.random_indices(4, 2, "low luck").unwrap(), second);
        assert_eq!(replay.remaining(), 0);
    }

    #[test]
    fn test_replay_detects_divergence() {
        let mut recording = RecordingRandomSource::new(Counting(0), None);
        recording.random_indices(10, 3, "aa").unwrap();
        let mut replay = ReplayRandomSource::new(recording.into_log());

        let err = replay.random_indices(10, 2, "aa").unwrap_err();
        assert!(matches!(err, CasualtyError::DiceLogMismatch { index: 0, .. }));
    }

    #[test]
    fn test_replay_exhausted() {
        let mut replay = ReplayRandomSource::new(DiceLog::default());
        assert!(replay.random_indices(6, 1, "aa").is_err());
    }
}
