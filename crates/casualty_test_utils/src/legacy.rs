//! Reference ranking by per-unit support adjustment.
//!
//! The pool is sorted by battle value (cost, unsupported strength, support
//! slots) and evaluated once. Each round scores the first remaining unit of
//! every type by its own power plus the power its support still adds, takes
//! the weakest, strips the support it granted from the units it was helping
//! and moves those units to the front for re-scoring. Rounds stop once the
//! ranked part is as long as what is left; the rest is appended in battle
//! value order.
//!
//! Against the group engine:
//! - only the first [`ranked_prefix_len`] entries are ranked at all
//! - without support both agree on that prefix unit for unit
//! - with one-for-one strength support (artillery and infantry) both leave
//!   the same power after every step of that prefix
//! - with several receiving types or roll support the scores go stale and
//!   the two may part ways

use std::collections::{HashMap, HashSet};

use casualty_core::casualty::OolParameters;
use casualty_core::combat_value::{CombatSide, StrengthAndRolls, SupportGrant, SupportTarget};
use casualty_core::error::Result;
use casualty_core::unit::{Unit, UnitId};

/// Sort key: cost, strength before support, support slots.
type BattleValue = (u32, i32, u32);

/// Entries of a legacy ranking that were actually ranked.
#[must_use]
pub const fn ranked_prefix_len(pool_len: usize) -> usize {
    pool_len.div_ceil(2)
}

/// Rank `params.targets` weakest first by per-unit support adjustment.
///
/// # Errors
///
/// Propagates errors from the combat value or unknown unit types.
pub fn legacy_order_of_losses<'a>(params: &OolParameters<'a>) -> Result<Vec<&'a Unit>> {
    let sides = params.combat_value.dice_sides();
    let battle_values = battle_values(params)?;
    let value_of = |unit: &Unit| battle_values.get(&unit.id).copied().unwrap_or_default();

    let mut pool = params.instance_order();
    pool.sort_by_key(|unit| value_of(*unit));

    // Strongest first, so support lands on the strongest receivers.
    let strongest_first: Vec<&Unit> = pool.iter().rev().copied().collect();
    let evaluation = params.combat_value.evaluate(&strongest_first)?;
    let mut values: HashMap<UnitId, StrengthAndRolls> = pool
        .iter()
        .map(|unit| (unit.id, evaluation.strength_and_rolls(unit.id)))
        .collect();
    let mut grants: HashMap<UnitId, Vec<SupportGrant>> = pool
        .iter()
        .map(|unit| (unit.id, evaluation.grants(unit.id).to_vec()))
        .collect();

    let mut ranked = Vec::with_capacity(pool.len());
    while ranked.len() < pool.len() {
        let mut seen = HashSet::new();
        let mut worst: Option<(usize, u32)> = None;
        for (index, unit) in pool.iter().enumerate() {
            if !seen.insert(unit.unit_type) {
                continue;
            }
            let unit_score = score(unit.id, &values, &grants, sides);
            let weaker = match worst {
                None => true,
                Some((current, min)) => {
                    unit_score < min
                        || (unit_score == min
                            && tie_key(value_of(*unit)) < tie_key(value_of(pool[current])))
                }
            };
            if weaker {
                worst = Some((index, unit_score));
            }
        }
        let Some((index, _)) = worst else {
            break;
        };

        let unit = pool.remove(index);
        for grant in grants.remove(&unit.id).unwrap_or_default() {
            let Some(value) = values.get_mut(&grant.receiver) else {
                continue;
            };
            value.strength -= grant.strength;
            value.rolls -= grant.rolls;
            if let Some(position) = pool.iter().position(|u| u.id == grant.receiver) {
                let receiver = pool.remove(position);
                pool.insert(0, receiver);
            }
        }
        values.remove(&unit.id);
        ranked.push(unit);
    }

    ranked.extend(pool);
    Ok(ranked)
}

/// Own power plus the power still added to living receivers.
fn score(
    unit: UnitId,
    values: &HashMap<UnitId, StrengthAndRolls>,
    grants: &HashMap<UnitId, Vec<SupportGrant>>,
    sides: u32,
) -> u32 {
    let own = values.get(&unit).map_or(0, |value| value.power(sides));
    let support: u32 = grants
        .get(&unit)
        .into_iter()
        .flatten()
        .filter_map(|grant| {
            let with = *values.get(&grant.receiver)?;
            let without = StrengthAndRolls {
                strength: with.strength - grant.strength,
                rolls: with.rolls - grant.rolls,
            };
            Some(with.power(sides).saturating_sub(without.power(sides)))
        })
        .sum();
    own + support
}

/// Equal scores: cheaper, then fewer support slots.
const fn tie_key(value: BattleValue) -> (u32, u32) {
    (value.0, value.2)
}

fn battle_values(params: &OolParameters<'_>) -> Result<HashMap<UnitId, BattleValue>> {
    let modifiers = params.combat_value.modifiers();
    let side = modifiers.side;
    let mut values = HashMap::with_capacity(params.targets.len());
    for unit in params.targets {
        let unit_type = params.data.unit_type(unit.unit_type)?;
        let strength = match side {
            CombatSide::Offense if modifiers.amphibious && unit.was_amphibious => {
                unit_type.attack + unit_type.amphibious_bonus
            }
            CombatSide::Offense => unit_type.attack,
            CombatSide::Defense => unit_type.defense,
        };
        let slots = params
            .data
            .support_rules
            .iter()
            .filter(|rule| {
                rule.target == SupportTarget::Allied
                    && rule.applies(side)
                    && rule.provider == unit.unit_type
            })
            .map(|rule| rule.number)
            .sum();
        values.insert(unit.id, (params.costs.cost(unit.unit_type), strength, slots));
    }
    Ok(values)
}
