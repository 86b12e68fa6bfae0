//! Error types for casualty resolution.

use thiserror::Error;

use crate::unit::{PlayerId, UnitTypeId};

/// Result type alias using [`CasualtyError`].
pub type Result<T> = std::result::Result<T, CasualtyError>;

/// Top-level error type for casualty selection and ranking.
#[derive(Debug, Error)]
pub enum CasualtyError {
    /// Unit type name not present in the registry.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    /// Unit type id not present in the registry.
    #[error("Invalid unit type ID: {0:?}")]
    InvalidUnitType(UnitTypeId),

    /// Data document parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// The group ranking picked a type/owner pair with no instance left in the pool.
    #[error("Order of losses corrupted: no {unit_type:?} owned by {owner:?} left in the pool")]
    OrderOfLossesCorrupted {
        /// Unit type that was chosen.
        unit_type: UnitTypeId,
        /// Owner that was chosen.
        owner: PlayerId,
    },

    /// Anti-air resolution produced the wrong number of casualties.
    #[error("Anti-air casualties wrong: expected {expected} hits, selected {actual}")]
    AaCasualtyCountMismatch {
        /// Hits that should have been allocated.
        expected: usize,
        /// Hit-equivalents actually allocated.
        actual: usize,
    },

    /// The decision-maker kept returning inconsistent selections.
    #[error("Casualty selection rejected {attempts} times, giving up")]
    SelectionRetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The random source returned values that cannot be used.
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// A replayed dice log diverged from the requested draw.
    #[error("Dice log mismatch at draw {index}: {message}")]
    DiceLogMismatch {
        /// Index of the draw in the log.
        index: usize,
        /// What differed.
        message: String,
    },

    /// Invalid persisted or configured state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
