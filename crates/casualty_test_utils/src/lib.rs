//! # Casualty Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture game data and unit spawning helpers
//! - Scripted random sources and deciders
//! - Determinism test harness
//! - Property-based testing strategies
//! - Reference ranking for cross-checking the order of losses

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod legacy;
pub mod scripted;

/// Re-export proptest for convenience.
pub use proptest;
