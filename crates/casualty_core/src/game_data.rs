//! Read-only game-wide data used during casualty resolution.

use std::collections::HashMap;

use crate::combat_value::SupportRule;
use crate::data::GameDataDef;
use crate::error::{CasualtyError, Result};
use crate::rules::CasualtyRules;
use crate::unit::{PlayerId, UnitType, UnitTypeId, UnitTypeRegistry};

/// A player and their production prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Prices that differ from the unit type's base cost.
    pub cost_overrides: HashMap<UnitTypeId, u32>,
}

/// Game data handle: dice, rules, players, unit types and support rules.
#[derive(Debug, Clone)]
pub struct GameData {
    /// Sides on each die.
    pub dice_sides: u32,
    /// Resolved rule flags.
    pub rules: CasualtyRules,
    /// Players in id order.
    pub players: Vec<Player>,
    /// Unit type templates.
    pub unit_types: UnitTypeRegistry,
    /// Support rules, applied in order.
    pub support_rules: Vec<SupportRule>,
}

impl GameData {
    /// Create empty game data with default rules.
    #[must_use]
    pub fn new(dice_sides: u32) -> Self {
        Self {
            dice_sides,
            rules: CasualtyRules::default(),
            players: Vec::new(),
            unit_types: UnitTypeRegistry::new(),
            support_rules: Vec::new(),
        }
    }

    /// Replace the rule flags.
    #[must_use]
    pub fn with_rules(mut self, rules: CasualtyRules) -> Self {
        self.rules = rules;
        self
    }

    /// Parse game data from a RON document.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let def: GameDataDef = ron::from_str(ron).map_err(|e| CasualtyError::DataParseError {
            source_name: "game data".to_string(),
            message: e.to_string(),
        })?;
        def.build()
    }

    /// Register a unit type.
    pub fn register_unit_type(&mut self, unit_type: UnitType) -> UnitTypeId {
        self.unit_types.register(unit_type)
    }

    /// Add a player and return its id.
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = PlayerId(self.players.len() as u16);
        self.players.push(Player {
            id,
            name: name.into(),
            cost_overrides: HashMap::new(),
        });
        id
    }

    /// Add a support rule.
    pub fn add_support_rule(&mut self, rule: SupportRule) {
        self.support_rules.push(rule);
    }

    /// Look up a unit type.
    pub fn unit_type(&self, id: UnitTypeId) -> Result<&UnitType> {
        self.unit_types.require(id)
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0 as usize)
    }

    /// Mutable player lookup, for setting cost overrides.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.0 as usize)
    }

    /// Production costs as seen by `player`.
    #[must_use]
    pub fn costs_for(&self, player: PlayerId) -> CostMap {
        let mut costs: HashMap<UnitTypeId, u32> = self
            .unit_types
            .all()
            .map(|unit_type| (unit_type.id, unit_type.cost))
            .collect();
        if let Some(player) = self.player(player) {
            costs.extend(player.cost_overrides.iter().map(|(&id, &cost)| (id, cost)));
        }
        CostMap(costs)
    }
}

/// Production cost per unit type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostMap(HashMap<UnitTypeId, u32>);

impl CostMap {
    /// Cost of a type. Unknown types cost nothing.
    #[must_use]
    pub fn cost(&self, unit_type: UnitTypeId) -> u32 {
        self.0.get(&unit_type).copied().unwrap_or(0)
    }
}

impl FromIterator<(UnitTypeId, u32)> for CostMap {
    fn from_iter<I: IntoIterator<Item = (UnitTypeId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costs_respect_overrides() {
        let mut data = GameData::new(6);
        let infantry = data.register_unit_type(UnitType::new("infantry").with_cost(3));
        let armour = data.register_unit_type(UnitType::new("armour").with_cost(6));
        let germans = data.add_player("Germans");
        let russians = data.add_player("Russians");
        data.player_mut(russians)
            .unwrap()
            .cost_overrides
            .insert(armour, 5);

        assert_eq!(data.costs_for(germans).cost(armour), 6);
        assert_eq!(data.costs_for(russians).cost(armour), 5);
        assert_eq!(data.costs_for(russians).cost(infantry), 3);
    }

    #[test]
    fn test_unknown_player_uses_base_costs() {
        let mut data = GameData::new(6);
        let infantry = data.register_unit_type(UnitType::new("infantry").with_cost(3));
        assert_eq!(data.costs_for(PlayerId(42)).cost(infantry), 3);
    }
}
