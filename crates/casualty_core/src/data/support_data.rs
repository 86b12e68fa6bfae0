//! Support rule definitions as written in data files.

use serde::{Deserialize, Serialize};

use crate::combat_value::{SupportKind, SupportTarget};

/// Data-driven support rule, referencing unit types by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportRuleDef {
    /// Rule name.
    pub name: String,

    /// Providing unit type name.
    pub provider: String,

    /// Supported unit type names.
    pub supported: Vec<String>,

    /// Strength or rolls.
    #[serde(default)]
    pub kind: SupportKind,

    /// Bonus per receiving unit.
    #[serde(default = "default_bonus")]
    pub bonus: i32,

    /// Active on offense.
    #[serde(default = "default_true")]
    pub offense: bool,

    /// Active on defense.
    #[serde(default = "default_true")]
    pub defense: bool,

    /// Units each provider supports.
    #[serde(default = "default_number")]
    pub number: u32,

    /// Allied or enemy units.
    #[serde(default)]
    pub target: SupportTarget,
}

const fn default_bonus() -> i32 {
    1
}

const fn default_true() -> bool {
    true
}

const fn default_number() -> u32 {
    1
}
