//! Unit identity and unit type templates.
//!
//! - [`UnitTypeId`]: numeric id assigned at load time, stable across peers
//! - [`UnitTraits`]: bitflags for fast classification queries
//! - [`UnitType`]: the immutable template shared by every unit of a type
//! - [`Unit`]: one identity-bearing combat participant
//! - [`UnitTypeRegistry`]: maps names to ids and owns the templates
//!
//! Units only reference their type by id. Casualty resolution reads units
//! and never mutates them; damage is owned by the battle that calls in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CasualtyError, Result};

/// Numeric identifier for a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct PlayerId(pub u16);

/// Numeric identifier for a territory (battle site).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TerritoryId(pub u32);

/// Identifier of a single battle, passed through to the decision-maker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleId(pub u64);

/// Unique identity of one unit instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

/// Numeric identifier for a unit type.
///
/// Assigned in registration order, so identical data files give
/// identical ids on every peer.
///
/// # Example
///
/// ```
/// use casualty_core::unit::UnitTypeId;
///
/// let id = UnitTypeId::new(3);
/// assert_eq!(id.as_u16(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitTypeId(u16);

impl UnitTypeId {
    /// Create a new unit type ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// Where a unit fights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Domain {
    /// Land unit.
    #[default]
    Land,
    /// Sea unit.
    Sea,
    /// Air unit.
    Air,
}

/// Bitflags for unit type classification.
///
/// # Example
///
/// ```
/// use casualty_core::unit::UnitTraits;
///
/// let traits = UnitTraits::TRANSPORT | UnitTraits::INFRASTRUCTURE;
/// assert!(traits.contains(UnitTraits::TRANSPORT));
/// assert!(!UnitTraits::TRANSPORT.contains(UnitTraits::INFRASTRUCTURE));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitTraits(u32);

impl UnitTraits {
    /// Infrastructure (factories, bases): absorbs no hits.
    pub const INFRASTRUCTURE: Self = Self(1 << 0);
    /// Carries other units; taken last when transport casualties are
    /// restricted.
    pub const TRANSPORT: Self = Self(1 << 1);

    /// No traits set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combine two trait sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Build trait flags from data tags. Unknown tags are ignored.
    #[must_use]
    pub fn from_tags(tags: &[String]) -> Self {
        tags.iter().fold(Self::empty(), |traits, tag| {
            traits.union(match tag.as_str() {
                "infrastructure" => Self::INFRASTRUCTURE,
                "transport" => Self::TRANSPORT,
                _ => Self::empty(),
            })
        })
    }
}

impl std::ops::BitOr for UnitTraits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Anti-air capability of a unit type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaStats {
    /// Strength of each AA shot.
    pub strength: i32,
    /// Shots per AA unit, `None` for one shot per target.
    pub max_attacks: Option<u32>,
    /// AA hits damage multi-hit-point targets instead of killing them.
    pub damages_targets: bool,
}

/// Immutable template for units of one type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    /// Id assigned by the registry.
    pub id: UnitTypeId,
    /// Unique name, also the primary pre-battle sort key.
    pub name: String,
    /// Hits the unit absorbs before dying.
    pub hit_points: u32,
    /// Offensive strength.
    pub attack: i32,
    /// Defensive strength.
    pub defense: i32,
    /// Dice rolled on offense.
    pub attack_rolls: u32,
    /// Dice rolled on defense.
    pub defense_rolls: u32,
    /// Land, sea or air.
    pub domain: Domain,
    /// Classification flags.
    pub traits: UnitTraits,
    /// Strength added on offense when landing amphibiously.
    pub amphibious_bonus: i32,
    /// AA stats, if the unit fires at aircraft.
    pub aa: Option<AaStats>,
    /// Production cost.
    pub cost: u32,
}

impl UnitType {
    /// Create a one-hit-point land type with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UnitTypeId(0),
            name: name.into(),
            hit_points: 1,
            attack: 0,
            defense: 0,
            attack_rolls: 1,
            defense_rolls: 1,
            domain: Domain::Land,
            traits: UnitTraits::empty(),
            amphibious_bonus: 0,
            aa: None,
            cost: 0,
        }
    }

    /// Set attack and defense strength.
    #[must_use]
    pub fn with_strength(mut self, attack: i32, defense: i32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self
    }

    /// Set the dice rolled on offense and defense.
    #[must_use]
    pub fn with_rolls(mut self, attack_rolls: u32, defense_rolls: u32) -> Self {
        self.attack_rolls = attack_rolls;
        self.defense_rolls = defense_rolls;
        self
    }

    /// Set the hit points.
    #[must_use]
    pub fn with_hit_points(mut self, hit_points: u32) -> Self {
        self.hit_points = hit_points;
        self
    }

    /// Set the production cost.
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Set the domain.
    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Add trait flags.
    #[must_use]
    pub fn with_traits(mut self, traits: UnitTraits) -> Self {
        self.traits = self.traits.union(traits);
        self
    }

    /// Set the amphibious assault bonus.
    #[must_use]
    pub fn with_amphibious_bonus(mut self, bonus: i32) -> Self {
        self.amphibious_bonus = bonus;
        self
    }

    /// Give the type anti-air capability.
    #[must_use]
    pub fn with_aa(mut self, aa: AaStats) -> Self {
        self.aa = Some(aa);
        self
    }

    /// Whether this is a land unit.
    #[must_use]
    pub fn is_land(&self) -> bool {
        self.domain == Domain::Land
    }

    /// Whether this type absorbs no hits.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        self.traits.contains(UnitTraits::INFRASTRUCTURE)
    }

    /// Whether this type carries other units.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.traits.contains(UnitTraits::TRANSPORT)
    }
}

/// One combat participant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identity.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Type template.
    pub unit_type: UnitTypeId,
    /// Damage already taken.
    pub hits: u32,
    /// Movement remaining this turn.
    pub movement_left: u32,
    /// Landed from the sea this turn.
    pub was_amphibious: bool,
    /// Units carried by this one.
    pub transporting: Vec<UnitId>,
}

impl Unit {
    /// Create an undamaged unit.
    #[must_use]
    pub const fn new(id: UnitId, owner: PlayerId, unit_type: UnitTypeId) -> Self {
        Self {
            id,
            owner,
            unit_type,
            hits: 0,
            movement_left: 0,
            was_amphibious: false,
            transporting: Vec::new(),
        }
    }

    /// Set damage taken.
    #[must_use]
    pub fn with_hits(mut self, hits: u32) -> Self {
        self.hits = hits;
        self
    }

    /// Set movement remaining.
    #[must_use]
    pub fn with_movement_left(mut self, movement_left: u32) -> Self {
        self.movement_left = movement_left;
        self
    }

    /// Mark the unit as having landed amphibiously.
    #[must_use]
    pub fn amphibious(mut self) -> Self {
        self.was_amphibious = true;
        self
    }

    /// Load cargo onto the unit.
    #[must_use]
    pub fn with_cargo(mut self, cargo: Vec<UnitId>) -> Self {
        self.transporting = cargo;
        self
    }

    /// Hit points left given the unit's type.
    #[must_use]
    pub fn hit_points_left(&self, unit_type: &UnitType) -> u32 {
        unit_type.hit_points.saturating_sub(self.hits)
    }
}

/// Registry of unit type templates.
///
/// Built once when game data loads and read-only afterwards, so it can be
/// shared across threads.
#[derive(Default, Debug, Clone)]
pub struct UnitTypeRegistry {
    by_id: Vec<UnitType>,
    by_name: HashMap<String, UnitTypeId>,
}

impl UnitTypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit type and return its id.
    ///
    /// Registering a name twice returns the existing id and keeps the
    /// first template.
    pub fn register(&mut self, mut unit_type: UnitType) -> UnitTypeId {
        if let Some(&existing) = self.by_name.get(&unit_type.name) {
            return existing;
        }

        let id = UnitTypeId::new(self.by_id.len() as u16);
        unit_type.id = id;
        self.by_name.insert(unit_type.name.clone(), id);
        self.by_id.push(unit_type);
        id
    }

    /// Get a unit type by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.by_id.get(id.0 as usize)
    }

    /// Get a unit type by id, failing for unknown ids.
    pub fn require(&self, id: UnitTypeId) -> Result<&UnitType> {
        self.get(id).ok_or(CasualtyError::InvalidUnitType(id))
    }

    /// Find a unit type id by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<UnitTypeId> {
        self.by_name.get(name).copied()
    }

    /// All registered types in id order.
    pub fn all(&self) -> impl Iterator<Item = &UnitType> {
        self.by_id.iter()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_assigns_ids_in_order() {
        let mut registry = UnitTypeRegistry::new();
        let infantry = registry.register(UnitType::new("infantry"));
        let armour = registry.register(UnitType::new("armour"));

        assert_eq!(infantry.as_u16(), 0);
        assert_eq!(armour.as_u16(), 1);
        assert_eq!(registry.find("armour"), Some(armour));
        assert_eq!(registry.get(armour).map(|t| t.id), Some(armour));
    }

    #[test]
    fn test_registry_duplicate_name_keeps_first() {
        let mut registry = UnitTypeRegistry::new();
        let first = registry.register(UnitType::new("infantry").with_cost(3));
        let second = registry.register(UnitType::new("infantry").with_cost(99));

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(first).map(|t| t.cost), Some(3));
    }

    #[test]
    fn test_require_unknown_type() {
        let registry = UnitTypeRegistry::new();
        assert!(matches!(
            registry.require(UnitTypeId::new(7)),
            Err(CasualtyError::InvalidUnitType(_))
        ));
    }

    #[test]
    fn test_traits_from_tags() {
        let tags = vec!["transport".to_string(), "first_strike".to_string()];
        let traits = UnitTraits::from_tags(&tags);
        assert_eq!(traits, UnitTraits::TRANSPORT);
        assert!(!traits.contains(UnitTraits::INFRASTRUCTURE));
    }

    #[test]
    fn test_hit_points_left() {
        let battleship = UnitType::new("battleship").with_hit_points(2);
        let unit = Unit::new(UnitId(1), PlayerId(0), battleship.id).with_hits(1);
        assert_eq!(unit.hit_points_left(&battleship), 1);
        assert_eq!(unit.clone().with_hits(5).hit_points_left(&battleship), 0);
    }
}
