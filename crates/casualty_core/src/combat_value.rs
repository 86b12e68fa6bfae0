//! Effective combat power of a unit pool.
//!
//! The ranking engine asks a [`CombatValue`] to evaluate whatever is left
//! of a pool after each removal, so support is re-allocated every time a
//! provider or receiver dies.
//!
//! Two implementations are provided:
//! - [`MainCombatValue`]: regular dice, with allied and enemy support,
//!   amphibious assault bonuses and territory effects
//! - [`AaCombatValue`]: anti-air shots at a known number of targets

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game_data::GameData;
use crate::unit::{Unit, UnitId, UnitTypeId};

/// Whether a pool is attacking or defending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CombatSide {
    /// Attacking.
    #[default]
    Offense,
    /// Defending.
    Defense,
}

/// What a support rule adds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SupportKind {
    /// Adds to strength.
    #[default]
    Strength,
    /// Adds dice.
    Rolls,
}

/// Whose units a support rule affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SupportTarget {
    /// Friendly units fighting alongside the provider.
    #[default]
    Allied,
    /// Units fighting against the provider.
    Enemy,
}

/// One support relationship between unit types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRule {
    /// Rule name, for logs.
    pub name: String,
    /// Type that grants the bonus.
    pub provider: UnitTypeId,
    /// Types that may receive it.
    pub supported: Vec<UnitTypeId>,
    /// Strength or rolls.
    pub kind: SupportKind,
    /// Amount added per receiving unit (negative for enemy penalties).
    pub bonus: i32,
    /// Applies while the affected units attack.
    pub offense: bool,
    /// Applies while the affected units defend.
    pub defense: bool,
    /// Units each provider can support.
    pub number: u32,
    /// Allied or enemy units.
    pub target: SupportTarget,
}

impl SupportRule {
    /// Whether the rule is active for units fighting on `side`.
    #[must_use]
    pub const fn applies(&self, side: CombatSide) -> bool {
        match side {
            CombatSide::Offense => self.offense,
            CombatSide::Defense => self.defense,
        }
    }
}

/// Terrain or territory modifier for listed unit types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryEffect {
    /// Effect name.
    pub name: String,
    /// Types affected.
    pub unit_types: Vec<UnitTypeId>,
    /// Strength adjustment.
    pub strength_bonus: i32,
}

/// Context handed to the combat value calculator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombatModifiers {
    /// Attacking or defending.
    pub side: CombatSide,
    /// Amphibious assault.
    pub amphibious: bool,
    /// Effects of the battle site.
    pub territory_effects: Vec<TerritoryEffect>,
}

impl CombatModifiers {
    /// Modifiers for a plain attack or defense.
    #[must_use]
    pub const fn new(side: CombatSide) -> Self {
        Self {
            side,
            amphibious: false,
            territory_effects: Vec::new(),
        }
    }

    /// Mark the battle as an amphibious assault.
    #[must_use]
    pub fn amphibious(mut self) -> Self {
        self.amphibious = true;
        self
    }

    /// Add a territory effect.
    #[must_use]
    pub fn with_territory_effect(mut self, effect: TerritoryEffect) -> Self {
        self.territory_effects.push(effect);
        self
    }

    /// Whether the pool is defending.
    #[must_use]
    pub fn is_defending(&self) -> bool {
        self.side == CombatSide::Defense
    }
}

/// Strength and dice of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrengthAndRolls {
    /// Strength per die.
    pub strength: i32,
    /// Number of dice.
    pub rolls: i32,
}

impl StrengthAndRolls {
    /// Expected-hit power: strength capped at the dice sides, times rolls.
    #[must_use]
    pub fn power(self, dice_sides: u32) -> u32 {
        let sides = i32::try_from(dice_sides).unwrap_or(i32::MAX);
        let strength = self.strength.clamp(0, sides);
        strength.unsigned_abs() * self.rolls.max(0).unsigned_abs()
    }
}

/// Bonus one unit granted to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportGrant {
    /// Unit receiving the bonus.
    pub receiver: UnitId,
    /// Strength added.
    pub strength: i32,
    /// Rolls added.
    pub rolls: i32,
}

/// Result of evaluating a pool.
#[derive(Debug, Clone, Default)]
pub struct CombatEvaluation {
    dice_sides: u32,
    values: HashMap<UnitId, StrengthAndRolls>,
    granted: HashMap<UnitId, Vec<SupportGrant>>,
}

impl CombatEvaluation {
    /// Create an empty evaluation for the given dice.
    #[must_use]
    pub fn new(dice_sides: u32) -> Self {
        Self {
            dice_sides,
            ..Self::default()
        }
    }

    /// Record a unit's value.
    pub fn set(&mut self, unit: UnitId, value: StrengthAndRolls) {
        self.values.insert(unit, value);
    }

    /// Record support `provider` gave.
    pub fn grant(&mut self, provider: UnitId, grant: SupportGrant) {
        if let Some(value) = self.values.get_mut(&grant.receiver) {
            value.strength += grant.strength;
            value.rolls += grant.rolls;
        }
        self.granted.entry(provider).or_default().push(grant);
    }

    /// Strength and rolls of a unit, including support received.
    #[must_use]
    pub fn strength_and_rolls(&self, unit: UnitId) -> StrengthAndRolls {
        self.values.get(&unit).copied().unwrap_or_default()
    }

    /// Power of a unit, including support received.
    #[must_use]
    pub fn power(&self, unit: UnitId) -> u32 {
        self.strength_and_rolls(unit).power(self.dice_sides)
    }

    /// Summed power of every evaluated unit.
    #[must_use]
    pub fn total_power(&self) -> u32 {
        self.values
            .values()
            .map(|value| value.power(self.dice_sides))
            .sum()
    }

    /// Power the unit adds to others through support.
    #[must_use]
    pub fn support_power(&self, provider: UnitId) -> u32 {
        self.granted.get(&provider).map_or(0, |grants| {
            grants
                .iter()
                .map(|grant| {
                    let with = self.strength_and_rolls(grant.receiver);
                    let without = StrengthAndRolls {
                        strength: with.strength - grant.strength,
                        rolls: with.rolls - grant.rolls,
                    };
                    with.power(self.dice_sides)
                        .saturating_sub(without.power(self.dice_sides))
                })
                .sum()
        })
    }

    /// Own power plus support given.
    #[must_use]
    pub fn contribution(&self, unit: UnitId) -> u32 {
        self.power(unit) + self.support_power(unit)
    }

    /// Support grants made by `provider`.
    #[must_use]
    pub fn grants(&self, provider: UnitId) -> &[SupportGrant] {
        self.granted.get(&provider).map_or(&[], Vec::as_slice)
    }
}

/// Calculator for the effective combat power of units.
pub trait CombatValue {
    /// Context the values are computed in.
    fn modifiers(&self) -> &CombatModifiers;

    /// Sides on each die.
    fn dice_sides(&self) -> u32;

    /// Evaluate `units` fighting together.
    ///
    /// # Errors
    ///
    /// Returns an error if a unit references an unknown type.
    fn evaluate(&self, units: &[&Unit]) -> Result<CombatEvaluation>;

    /// Opposing units whose support rules reach into this pool.
    fn enemy_units(&self) -> &[Unit] {
        &[]
    }
}

/// Regular combat value with support.
#[derive(Debug, Clone)]
pub struct MainCombatValue<'a> {
    data: &'a GameData,
    modifiers: CombatModifiers,
    enemy_units: &'a [Unit],
}

impl<'a> MainCombatValue<'a> {
    /// Create a calculator with no enemy units.
    #[must_use]
    pub const fn new(data: &'a GameData, modifiers: CombatModifiers) -> Self {
        Self {
            data,
            modifiers,
            enemy_units: &[],
        }
    }

    /// Set the opposing units, whose enemy-support rules apply.
    #[must_use]
    pub fn with_enemy_units(mut self, enemy_units: &'a [Unit]) -> Self {
        self.enemy_units = enemy_units;
        self
    }

    fn base_value(&self, unit: &Unit) -> Result<StrengthAndRolls> {
        let unit_type = self.data.unit_type(unit.unit_type)?;
        let (mut strength, rolls) = match self.modifiers.side {
            CombatSide::Offense => (unit_type.attack, unit_type.attack_rolls),
            CombatSide::Defense => (unit_type.defense, unit_type.defense_rolls),
        };
        if self.modifiers.side == CombatSide::Offense
            && self.modifiers.amphibious
            && unit.was_amphibious
        {
            strength += unit_type.amphibious_bonus;
        }
        for effect in &self.modifiers.territory_effects {
            if effect.unit_types.contains(&unit.unit_type) {
                strength += effect.strength_bonus;
            }
        }
        Ok(StrengthAndRolls {
            strength,
            rolls: i32::try_from(rolls).unwrap_or(i32::MAX),
        })
    }
}

impl CombatValue for MainCombatValue<'_> {
    fn modifiers(&self) -> &CombatModifiers {
        &self.modifiers
    }

    fn dice_sides(&self) -> u32 {
        self.data.dice_sides
    }

    fn enemy_units(&self) -> &[Unit] {
        self.enemy_units
    }

    fn evaluate(&self, units: &[&Unit]) -> Result<CombatEvaluation> {
        let mut evaluation = CombatEvaluation::new(self.data.dice_sides);
        for unit in units {
            evaluation.set(unit.id, self.base_value(unit)?);
        }

        // Strongest receivers get support first.
        let mut receivers: Vec<&Unit> = units.to_vec();
        receivers.sort_by_key(|unit| std::cmp::Reverse(evaluation.strength_and_rolls(unit.id).strength));

        let enemies: Vec<&Unit> = self.enemy_units.iter().collect();
        for rule in &self.data.support_rules {
            if !rule.applies(self.modifiers.side) {
                continue;
            }
            let providers: &[&Unit] = match rule.target {
                SupportTarget::Allied => units,
                SupportTarget::Enemy => &enemies,
            };
            let mut slots: Vec<(UnitId, u32)> = providers
                .iter()
                .filter(|unit| unit.unit_type == rule.provider)
                .map(|unit| (unit.id, rule.number))
                .collect();
            if slots.is_empty() {
                continue;
            }

            for receiver in receivers.iter().filter(|unit| rule.supported.contains(&unit.unit_type)) {
                let Some(slot) = slots
                    .iter_mut()
                    .find(|(provider, left)| *left > 0 && *provider != receiver.id)
                else {
                    break;
                };
                slot.1 -= 1;
                let (strength, rolls) = match rule.kind {
                    SupportKind::Strength => (rule.bonus, 0),
                    SupportKind::Rolls => (0, rule.bonus),
                };
                let grant = SupportGrant {
                    receiver: receiver.id,
                    strength,
                    rolls,
                };
                match rule.target {
                    SupportTarget::Allied => evaluation.grant(slot.0, grant),
                    SupportTarget::Enemy => {
                        let value = evaluation.strength_and_rolls(receiver.id);
                        evaluation.set(
                            receiver.id,
                            StrengthAndRolls {
                                strength: value.strength + strength,
                                rolls: value.rolls + rolls,
                            },
                        );
                    }
                }
            }
        }

        Ok(evaluation)
    }
}

/// Anti-air combat value against a known number of targets.
#[derive(Debug, Clone)]
pub struct AaCombatValue<'a> {
    data: &'a GameData,
    modifiers: CombatModifiers,
    target_count: usize,
}

impl<'a> AaCombatValue<'a> {
    /// Create an AA calculator firing at `target_count` aircraft.
    #[must_use]
    pub const fn new(data: &'a GameData, modifiers: CombatModifiers, target_count: usize) -> Self {
        Self {
            data,
            modifiers,
            target_count,
        }
    }
}

impl CombatValue for AaCombatValue<'_> {
    fn modifiers(&self) -> &CombatModifiers {
        &self.modifiers
    }

    fn dice_sides(&self) -> u32 {
        self.data.dice_sides
    }

    fn evaluate(&self, units: &[&Unit]) -> Result<CombatEvaluation> {
        let mut evaluation = CombatEvaluation::new(self.data.dice_sides);
        for unit in units {
            let unit_type = self.data.unit_type(unit.unit_type)?;
            let value = unit_type.aa.as_ref().map_or_else(StrengthAndRolls::default, |aa| {
                let shots = aa
                    .max_attacks
                    .map_or(self.target_count, |max| (max as usize).min(self.target_count));
                StrengthAndRolls {
                    strength: aa.strength,
                    rolls: i32::try_from(shots).unwrap_or(i32::MAX),
                }
            });
            evaluation.set(unit.id, value);
        }
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{PlayerId, UnitType};

    fn data_with_artillery() -> (GameData, UnitTypeId, UnitTypeId) {
        let mut data = GameData::new(6);
        let infantry = data.register_unit_type(UnitType::new("infantry").with_strength(1, 2));
        let artillery = data.register_unit_type(UnitType::new("artillery").with_strength(2, 2));
        data.add_support_rule(SupportRule {
            name: "artillery".to_string(),
            provider: artillery,
            supported: vec![infantry],
            kind: SupportKind::Strength,
            bonus: 1,
            offense: true,
            defense: false,
            number: 1,
            target: SupportTarget::Allied,
        });
        (data, infantry, artillery)
    }

    #[test]
    fn test_power_caps_strength_at_dice_sides() {
        let value = StrengthAndRolls { strength: 9, rolls: 2 };
        assert_eq!(value.power(6), 12);
        let negative = StrengthAndRolls { strength: -1, rolls: 3 };
        assert_eq!(negative.power(6), 0);
    }

    #[test]
    fn test_artillery_supports_one_infantry() {
        let (data, infantry, artillery) = data_with_artillery();
        let units = [
            Unit::new(UnitId(1), PlayerId(0), infantry),
            Unit::new(UnitId(2), PlayerId(0), infantry),
            Unit::new(UnitId(3), PlayerId(0), artillery),
        ];
        let refs: Vec<&Unit> = units.iter().collect();
        let value = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense));
        let evaluation = value.evaluate(&refs).unwrap();

        assert_eq!(evaluation.power(UnitId(1)), 2);
        assert_eq!(evaluation.power(UnitId(2)), 1);
        assert_eq!(evaluation.support_power(UnitId(3)), 1);
        assert_eq!(evaluation.contribution(UnitId(3)), 3);
    }

    #[test]
    fn test_support_inactive_on_defense() {
        let (data, infantry, artillery) = data_with_artillery();
        let units = [
            Unit::new(UnitId(1), PlayerId(0), infantry),
            Unit::new(UnitId(2), PlayerId(0), artillery),
        ];
        let refs: Vec<&Unit> = units.iter().collect();
        let value = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Defense));
        let evaluation = value.evaluate(&refs).unwrap();

        assert_eq!(evaluation.power(UnitId(1)), 2);
        assert!(evaluation.grants(UnitId(2)).is_empty());
    }

    #[test]
    fn test_amphibious_bonus_only_for_landed_units() {
        let mut data = GameData::new(6);
        let marine = data.register_unit_type(
            UnitType::new("marine").with_strength(1, 2).with_amphibious_bonus(1),
        );
        let units = [
            Unit::new(UnitId(1), PlayerId(0), marine).amphibious(),
            Unit::new(UnitId(2), PlayerId(0), marine),
        ];
        let refs: Vec<&Unit> = units.iter().collect();
        let value =
            MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense).amphibious());
        let evaluation = value.evaluate(&refs).unwrap();

        assert_eq!(evaluation.power(UnitId(1)), 2);
        assert_eq!(evaluation.power(UnitId(2)), 1);
    }

    #[test]
    fn test_enemy_support_penalty() {
        let mut data = GameData::new(6);
        let fighter = data.register_unit_type(UnitType::new("fighter").with_strength(3, 4));
        let radar = data.register_unit_type(UnitType::new("jammer"));
        data.add_support_rule(SupportRule {
            name: "jamming".to_string(),
            provider: radar,
            supported: vec![fighter],
            kind: SupportKind::Strength,
            bonus: -1,
            offense: true,
            defense: true,
            number: 1,
            target: SupportTarget::Enemy,
        });
        let enemy = [Unit::new(UnitId(10), PlayerId(1), radar)];
        let units = [Unit::new(UnitId(1), PlayerId(0), fighter)];
        let refs: Vec<&Unit> = units.iter().collect();
        let value = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense))
            .with_enemy_units(&enemy);
        let evaluation = value.evaluate(&refs).unwrap();

        assert_eq!(evaluation.power(UnitId(1)), 2);
    }

    #[test]
    fn test_aa_rolls_limited_by_targets() {
        let mut data = GameData::new(6);
        let gun = data.register_unit_type(UnitType::new("aa_gun").with_aa(crate::unit::AaStats {
            strength: 1,
            max_attacks: Some(3),
            damages_targets: false,
        }));
        let units = [Unit::new(UnitId(1), PlayerId(0), gun)];
        let refs: Vec<&Unit> = units.iter().collect();

        let few = AaCombatValue::new(&data, CombatModifiers::new(CombatSide::Defense), 2);
        assert_eq!(few.evaluate(&refs).unwrap().strength_and_rolls(UnitId(1)).rolls, 2);

        let many = AaCombatValue::new(&data, CombatModifiers::new(CombatSide::Defense), 10);
        assert_eq!(many.evaluate(&refs).unwrap().strength_and_rolls(UnitId(1)).rolls, 3);
    }
}
