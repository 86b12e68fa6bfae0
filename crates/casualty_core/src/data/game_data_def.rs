//! Top-level game data document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::support_data::SupportRuleDef;
use super::unit_type_data::UnitTypeDef;
use crate::combat_value::SupportRule;
use crate::error::{CasualtyError, Result};
use crate::game_data::GameData;
use crate::rules::CasualtyRules;
use crate::unit::UnitTypeId;

/// A player entry in the data document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDef {
    /// Display name.
    pub name: String,

    /// Prices by unit type name that differ from the base cost.
    #[serde(default)]
    pub cost_overrides: HashMap<String, u32>,
}

/// Complete game data definition.
///
/// # Example RON
///
/// ```ron
/// GameDataDef(
///     dice_sides: 6,
///     rules: (low_luck: true),
///     players: [(name: "Germans")],
///     unit_types: [(name: "infantry", attack: 1, defense: 2, cost: 3)],
///     support: [],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDataDef {
    /// Sides on each die.
    #[serde(default = "default_dice_sides")]
    pub dice_sides: u32,

    /// Rule flags.
    #[serde(default)]
    pub rules: CasualtyRules,

    /// Players, ids assigned in order.
    #[serde(default)]
    pub players: Vec<PlayerDef>,

    /// Unit types, ids assigned in order.
    pub unit_types: Vec<UnitTypeDef>,

    /// Support rules.
    #[serde(default)]
    pub support: Vec<SupportRuleDef>,
}

const fn default_dice_sides() -> u32 {
    6
}

impl GameDataDef {
    /// Resolve names and build the game data.
    ///
    /// # Errors
    ///
    /// Returns [`CasualtyError::UnknownUnitType`] if a support rule or cost
    /// override names a type that is not defined, and
    /// [`CasualtyError::InvalidState`] for zero dice sides.
    pub fn build(&self) -> Result<GameData> {
        if self.dice_sides == 0 {
            return Err(CasualtyError::InvalidState(
                "dice_sides must be at least 1".to_string(),
            ));
        }
        let mut data = GameData::new(self.dice_sides).with_rules(self.rules.clone());
        for def in &self.unit_types {
            data.register_unit_type(def.to_unit_type());
        }

        let resolve = |data: &GameData, name: &str| -> Result<UnitTypeId> {
            data.unit_types
                .find(name)
                .ok_or_else(|| CasualtyError::UnknownUnitType(name.to_string()))
        };

        for def in &self.players {
            let id = data.add_player(def.name.clone());
            let mut overrides = HashMap::new();
            for (name, &cost) in &def.cost_overrides {
                overrides.insert(resolve(&data, name)?, cost);
            }
            if let Some(player) = data.player_mut(id) {
                player.cost_overrides = overrides;
            }
        }

        for def in &self.support {
            let rule = SupportRule {
                name: def.name.clone(),
                provider: resolve(&data, &def.provider)?,
                supported: def
                    .supported
                    .iter()
                    .map(|name| resolve(&data, name))
                    .collect::<Result<Vec<_>>>()?,
                kind: def.kind,
                bonus: def.bonus,
                offense: def.offense,
                defense: def.defense,
                number: def.number,
                target: def.target,
            };
            data.add_support_rule(rule);
        }

        tracing::debug!(
            unit_types = data.unit_types.len(),
            support_rules = data.support_rules.len(),
            "Game data built"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        GameDataDef(
            dice_sides: 6,
            rules: (partial_amphibious_retreat: true),
            players: [
                (name: "Germans"),
                (name: "Russians", cost_overrides: {"armour": 5}),
            ],
            unit_types: [
                (name: "infantry", attack: 1, defense: 2, cost: 3),
                (name: "artillery", attack: 2, defense: 2, cost: 4),
                (name: "armour", attack: 3, defense: 3, cost: 6),
                (name: "battleship", hit_points: 2, attack: 4, defense: 4, domain: Sea, cost: 20),
            ],
            support: [
                (name: "artillery", provider: "artillery", supported: ["infantry"], defense: false),
            ],
        )
    "#;

    #[test]
    fn test_build_resolves_names() {
        let data = GameData::from_ron_str(DOC).unwrap();
        assert_eq!(data.unit_types.len(), 4);
        assert!(data.rules.partial_amphibious_retreat);

        let armour = data.unit_types.find("armour").unwrap();
        let russians = data.players[1].id;
        assert_eq!(data.costs_for(russians).cost(armour), 5);

        let rule = &data.support_rules[0];
        assert_eq!(rule.supported, vec![data.unit_types.find("infantry").unwrap()]);
        assert!(rule.offense);
        assert!(!rule.defense);
        assert_eq!(rule.number, 1);

        let battleship = data.unit_types.find("battleship").unwrap();
        assert_eq!(data.unit_type(battleship).unwrap().hit_points, 2);
    }

    #[test]
    fn test_unknown_type_in_support_rule() {
        let doc = r#"(
            unit_types: [(name: "infantry")],
            support: [(name: "bad", provider: "artillery", supported: ["infantry"])],
        )"#;
        let err = GameData::from_ron_str(doc).unwrap_err();
        assert!(matches!(err, CasualtyError::UnknownUnitType(name) if name == "artillery"));
    }

    #[test]
    fn test_zero_dice_sides_rejected() {
        let doc = r#"(dice_sides: 0, unit_types: [])"#;
        assert!(matches!(
            GameData::from_ron_str(doc),
            Err(CasualtyError::InvalidState(_))
        ));
    }
}
