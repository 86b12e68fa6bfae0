//! # Casualty Core
//!
//! Casualty selection for turn-based wargame battles.
//!
//! This crate decides which units are removed or damaged when a side takes
//! hits. It contains **only** deterministic logic:
//! - No rendering
//! - No prompting (decisions go through [`decision::CasualtyDecider`])
//! - No system randomness (draws go through [`random::RandomSource`])
//!
//! This separation enables:
//! - Headless battle resolution
//! - Dice log record and replay
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`casualty`] - Selection, ranking, and AA casualties
//! - [`combat_value`] - Strength, rolls, and support for a set of units
//! - [`unit`] - Unit types, instances, and the type registry
//! - [`game_data`] - Players, costs, rules, and support for one game
//! - [`data`] - RON data definitions
//! - [`dice`] - Rolled dice and hit counts
//! - [`random`] - Random source abstraction and dice logs

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod casualty;
pub mod combat_value;
pub mod data;
pub mod decision;
pub mod dice;
pub mod error;
pub mod game_data;
pub mod random;
pub mod rules;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::casualty::{
        clear_ool_cache, AaCasualtyRequest, AaCasualtySelector, CasualtyDetails,
        CasualtyOrderOfLosses, CasualtyRequest, CasualtySelector, OolCache, OolParameters,
    };
    pub use crate::combat_value::{
        AaCombatValue, CombatModifiers, CombatSide, CombatValue, MainCombatValue, SupportRule,
    };
    pub use crate::decision::{CasualtyDecider, DefaultCasualtyDecider, SelectionRequest};
    pub use crate::dice::{DiceRoll, Die, DieType, HitsInfo};
    pub use crate::error::{CasualtyError, Result};
    pub use crate::game_data::{CostMap, GameData};
    pub use crate::random::{DiceLog, RandomSource, RecordingRandomSource, ReplayRandomSource};
    pub use crate::rules::CasualtyRules;
    pub use crate::unit::{
        BattleId, Domain, PlayerId, TerritoryId, Unit, UnitId, UnitType, UnitTypeId,
    };
}
