//! Unit type definitions as written in data files.

use serde::{Deserialize, Serialize};

use crate::unit::{AaStats, Domain, UnitTraits, UnitType};

/// Data-driven unit type definition.
///
/// # Example RON
///
/// ```ron
/// UnitTypeDef(
///     name: "battleship",
///     hit_points: 2,
///     attack: 4,
///     defense: 4,
///     domain: Sea,
///     cost: 20,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeDef {
    /// Unique name.
    pub name: String,

    /// Hit points.
    #[serde(default = "default_hit_points")]
    pub hit_points: u32,

    /// Offensive strength.
    #[serde(default)]
    pub attack: i32,

    /// Defensive strength.
    #[serde(default)]
    pub defense: i32,

    /// Dice rolled on offense.
    #[serde(default = "default_rolls")]
    pub attack_rolls: u32,

    /// Dice rolled on defense.
    #[serde(default = "default_rolls")]
    pub defense_rolls: u32,

    /// Land, sea or air.
    #[serde(default)]
    pub domain: Domain,

    /// Trait tags such as "infrastructure" or "transport".
    #[serde(default)]
    pub tags: Vec<String>,

    /// Amphibious assault bonus.
    #[serde(default)]
    pub amphibious_bonus: i32,

    /// Anti-air stats.
    #[serde(default)]
    pub aa: Option<AaStats>,

    /// Production cost.
    #[serde(default)]
    pub cost: u32,
}

const fn default_hit_points() -> u32 {
    1
}

const fn default_rolls() -> u32 {
    1
}

impl UnitTypeDef {
    /// Convert into a template; the registry assigns the id.
    #[must_use]
    pub fn to_unit_type(&self) -> UnitType {
        let mut unit_type = UnitType::new(self.name.clone())
            .with_hit_points(self.hit_points)
            .with_strength(self.attack, self.defense)
            .with_rolls(self.attack_rolls, self.defense_rolls)
            .with_domain(self.domain)
            .with_traits(UnitTraits::from_tags(&self.tags))
            .with_amphibious_bonus(self.amphibious_bonus)
            .with_cost(self.cost);
        unit_type.aa.clone_from(&self.aa);
        unit_type
    }
}
