//! Order of losses: the canonical weakest-first ranking of a pool.
//!
//! Rankings come from [`OrderOfLossesCalculatorByUnitGroup`] and are
//! memoised by context signature in an [`OolCache`]. A cached order stores
//! unit types only; it is mapped back onto the live pool by taking, for each
//! type, the next instance in [`OolParameters::instance_order`]. The group
//! engine takes instances in the same order, so cached and fresh rankings
//! agree unit for unit.

use super::by_unit_group::OrderOfLossesCalculatorByUnitGroup;
use super::ool_cache::OolCache;
use super::parameters::OolParameters;
use crate::error::Result;
use crate::unit::{Unit, UnitTypeId};

/// Ranking front-end with caching.
#[derive(Debug, Clone, Copy)]
pub struct CasualtyOrderOfLosses<'c> {
    cache: &'c OolCache,
}

impl Default for CasualtyOrderOfLosses<'static> {
    fn default() -> Self {
        Self::new(OolCache::global())
    }
}

impl<'c> CasualtyOrderOfLosses<'c> {
    /// Rank using `cache`.
    #[must_use]
    pub const fn new(cache: &'c OolCache) -> Self {
        Self { cache }
    }

    /// The full pool, weakest first.
    ///
    /// # Errors
    ///
    /// Propagates errors from the group engine or the combat value.
    pub fn sort_units_for_casualties_with_support<'a>(
        &self,
        params: &OolParameters<'a>,
    ) -> Result<Vec<&'a Unit>> {
        if params.targets.is_empty() {
            return Ok(Vec::new());
        }

        let key = params.cache_key();
        if let Some(types) = self.cache.get(&key) {
            if let Some(order) = apply_type_order(&types, params.instance_order()) {
                #[cfg(feature = "debug-validation")]
                self.validate_cached(params, &order)?;
                tracing::trace!(pool = order.len(), "Order of losses cache hit");
                return Ok(order);
            }
            tracing::warn!(?key, "Cached order of losses does not fit the pool, recomputing");
        }

        let full = params.with_hits(params.targets.len());
        let order = OrderOfLossesCalculatorByUnitGroup::new(&full).calculate()?;
        let types: Vec<UnitTypeId> = order.iter().map(|unit| unit.unit_type).collect();
        self.cache.insert_with_suffixes(key, &types);
        Ok(order)
    }

    #[cfg(feature = "debug-validation")]
    fn validate_cached(&self, params: &OolParameters<'_>, cached: &[&Unit]) -> Result<()> {
        let full = params.with_hits(params.targets.len());
        let fresh = OrderOfLossesCalculatorByUnitGroup::new(&full).calculate()?;
        let same = fresh.iter().map(|u| u.unit_type).eq(cached.iter().map(|u| u.unit_type));
        if !same {
            return Err(crate::error::CasualtyError::InvalidState(
                "cached order of losses differs from a fresh ranking".to_string(),
            ));
        }
        Ok(())
    }
}

/// Map a type order onto instances, or `None` if the counts differ.
fn apply_type_order<'a>(types: &[UnitTypeId], pool: Vec<&'a Unit>) -> Option<Vec<&'a Unit>> {
    if types.len() != pool.len() {
        return None;
    }
    let mut remaining: Vec<Option<&'a Unit>> = pool.into_iter().map(Some).collect();
    types
        .iter()
        .map(|&unit_type| {
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.is_some_and(|unit| unit.unit_type == unit_type))?;
            slot.take()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_value::{
        CombatModifiers, CombatSide, MainCombatValue, SupportKind, SupportRule, SupportTarget,
    };
    use crate::game_data::GameData;
    use crate::unit::{Domain, PlayerId, TerritoryId, UnitId, UnitType};

    struct Types {
        infantry: UnitTypeId,
        artillery: UnitTypeId,
        armour: UnitTypeId,
        marine: UnitTypeId,
        fighter: UnitTypeId,
        battleship: UnitTypeId,
    }

    fn data() -> (GameData, Types) {
        let mut data = GameData::new(6);
        let infantry =
            data.register_unit_type(UnitType::new("infantry").with_strength(1, 2).with_cost(3));
        let artillery =
            data.register_unit_type(UnitType::new("artillery").with_strength(2, 2).with_cost(4));
        let armour =
            data.register_unit_type(UnitType::new("armour").with_strength(3, 3).with_cost(6));
        let marine = data.register_unit_type(
            UnitType::new("marine")
                .with_strength(1, 2)
                .with_amphibious_bonus(1)
                .with_cost(4),
        );
        let fighter = data.register_unit_type(
            UnitType::new("fighter")
                .with_strength(3, 4)
                .with_domain(Domain::Air)
                .with_cost(10),
        );
        let battleship = data.register_unit_type(
            UnitType::new("battleship")
                .with_strength(4, 4)
                .with_hit_points(2)
                .with_domain(Domain::Sea)
                .with_cost(20),
        );
        data.add_support_rule(SupportRule {
            name: "artillery".to_string(),
            provider: artillery,
            supported: vec![infantry, marine],
            kind: SupportKind::Strength,
            bonus: 1,
            offense: true,
            defense: false,
            number: 1,
            target: SupportTarget::Allied,
        });
        (
            data,
            Types {
                infantry,
                artillery,
                armour,
                marine,
                fighter,
                battleship,
            },
        )
    }

    fn pool(types: &[UnitTypeId]) -> Vec<Unit> {
        types
            .iter()
            .enumerate()
            .map(|(i, &t)| Unit::new(UnitId(i as u64 + 1), PlayerId(0), t))
            .collect()
    }

    fn rank(data: &GameData, units: &[Unit], modifiers: CombatModifiers) -> Vec<UnitTypeId> {
        let cache = OolCache::new();
        let costs = data.costs_for(PlayerId(0));
        let combat_value = MainCombatValue::new(data, modifiers);
        let params =
            OolParameters::new(units, PlayerId(0), TerritoryId(0), &costs, &combat_value, data);
        CasualtyOrderOfLosses::new(&cache)
            .sort_units_for_casualties_with_support(&params)
            .unwrap()
            .iter()
            .map(|unit| unit.unit_type)
            .collect()
    }

    #[test]
    fn test_infantry_before_armour() {
        let (data, t) = data();
        let units = pool(&[t.armour, t.infantry]);
        let order = rank(&data, &units, CombatModifiers::new(CombatSide::Offense));
        assert_eq!(order, vec![t.infantry, t.armour]);
    }

    #[test]
    fn test_supported_infantry_still_dies_before_artillery() {
        let (data, t) = data();
        let units = pool(&[t.armour, t.artillery, t.infantry, t.marine]);
        let order = rank(&data, &units, CombatModifiers::new(CombatSide::Offense));
        // Losing either infantry or marine costs 1 once support moves; infantry is cheaper.
        assert_eq!(order, vec![t.infantry, t.marine, t.artillery, t.armour]);
    }

    #[test]
    fn test_amphibious_marines_outlast_infantry() {
        let (data, t) = data();
        let mut units = pool(&[t.infantry, t.infantry, t.marine, t.marine]);
        for unit in &mut units {
            unit.was_amphibious = true;
        }
        let order = rank(
            &data,
            &units,
            CombatModifiers::new(CombatSide::Offense).amphibious(),
        );
        assert_eq!(order, vec![t.infantry, t.infantry, t.marine, t.marine]);
    }

    #[test]
    fn test_cheaper_unit_first_on_equal_power() {
        let (data, t) = data();
        // Fighter defends at 4, battleship at 4.
        let units = pool(&[t.battleship, t.fighter]);
        let order = rank(&data, &units, CombatModifiers::new(CombatSide::Defense));
        assert_eq!(order, vec![t.fighter, t.battleship]);
    }

    #[test]
    fn test_cache_hit_maps_onto_new_instances() {
        let (data, t) = data();
        let cache = OolCache::new();
        let costs = data.costs_for(PlayerId(0));
        let combat_value = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense));
        let ranking = CasualtyOrderOfLosses::new(&cache);

        let first = pool(&[t.armour, t.infantry, t.artillery]);
        let params =
            OolParameters::new(&first, PlayerId(0), TerritoryId(0), &costs, &combat_value, &data);
        let fresh: Vec<UnitTypeId> = ranking
            .sort_units_for_casualties_with_support(&params)
            .unwrap()
            .iter()
            .map(|u| u.unit_type)
            .collect();
        assert_eq!(cache.len(), 3);

        let mut second = pool(&[t.artillery, t.armour, t.infantry]);
        for unit in &mut second {
            unit.id = UnitId(unit.id.0 + 100);
        }
        let params =
            OolParameters::new(&second, PlayerId(0), TerritoryId(0), &costs, &combat_value, &data);
        let cached = ranking.sort_units_for_casualties_with_support(&params).unwrap();

        assert_eq!(cached.iter().map(|u| u.unit_type).collect::<Vec<_>>(), fresh);
        assert!(cached.iter().all(|u| u.id.0 > 100));
    }

    #[test]
    fn test_enemy_support_gets_its_own_cache_entry() {
        let (mut data, t) = data();
        let jammer = data.register_unit_type(UnitType::new("jammer").with_cost(5));
        data.add_support_rule(SupportRule {
            name: "jamming".to_string(),
            provider: jammer,
            supported: vec![t.armour],
            kind: SupportKind::Strength,
            bonus: -2,
            offense: false,
            defense: true,
            number: 1,
            target: SupportTarget::Enemy,
        });
        let enemy = vec![Unit::new(UnitId(100), PlayerId(1), jammer)];
        let units = pool(&[t.infantry, t.armour]);
        let cache = OolCache::new();
        let costs = data.costs_for(PlayerId(0));
        let ranking = CasualtyOrderOfLosses::new(&cache);
        let types = |order: Vec<&Unit>| order.iter().map(|u| u.unit_type).collect::<Vec<_>>();

        let plain = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Defense));
        let params =
            OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &plain, &data);
        let unjammed = types(ranking.sort_units_for_casualties_with_support(&params).unwrap());
        assert_eq!(unjammed, vec![t.infantry, t.armour]);

        // Jammed armour defends at 1, below infantry.
        let jammed = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Defense))
            .with_enemy_units(&enemy);
        let params =
            OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &jammed, &data);
        let plain_params =
            OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &plain, &data);
        assert_ne!(params.cache_key(), plain_params.cache_key());
        let cached = types(ranking.sort_units_for_casualties_with_support(&params).unwrap());
        let fresh = types(
            CasualtyOrderOfLosses::new(&OolCache::new())
                .sort_units_for_casualties_with_support(&params)
                .unwrap(),
        );
        assert_eq!(fresh, vec![t.armour, t.infantry]);
        assert_eq!(cached, fresh);
    }

    #[test]
    fn test_inactive_enemy_support_shares_the_plain_entry() {
        let (mut data, t) = data();
        let jammer = data.register_unit_type(UnitType::new("jammer").with_cost(5));
        data.add_support_rule(SupportRule {
            name: "jamming".to_string(),
            provider: jammer,
            supported: vec![t.armour],
            kind: SupportKind::Strength,
            bonus: -2,
            offense: false,
            defense: true,
            number: 1,
            target: SupportTarget::Enemy,
        });
        let enemy = vec![
            Unit::new(UnitId(100), PlayerId(1), jammer),
            Unit::new(UnitId(101), PlayerId(1), t.infantry),
        ];
        let units = pool(&[t.infantry, t.armour]);
        let costs = data.costs_for(PlayerId(0));

        // The rule only bites on defense, and enemy infantry provides nothing.
        let plain = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense));
        let attacking = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense))
            .with_enemy_units(&enemy);
        let a = OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &plain, &data);
        let b = OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &attacking, &data);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_damaged_instance_ranked_first_within_type() {
        let (data, t) = data();
        let units = vec![
            Unit::new(UnitId(1), PlayerId(0), t.battleship),
            Unit::new(UnitId(2), PlayerId(0), t.battleship).with_hits(1),
        ];
        let cache = OolCache::new();
        let costs = data.costs_for(PlayerId(0));
        let combat_value = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Defense));
        let params =
            OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &combat_value, &data);
        let order = CasualtyOrderOfLosses::new(&cache)
            .sort_units_for_casualties_with_support(&params)
            .unwrap();
        assert_eq!(order[0].id, UnitId(2));
    }

    #[test]
    fn test_group_engine_stops_at_hits() {
        let (data, t) = data();
        let units = pool(&[t.armour, t.infantry, t.artillery, t.infantry]);
        let costs = data.costs_for(PlayerId(0));
        let combat_value = MainCombatValue::new(&data, CombatModifiers::new(CombatSide::Offense));
        let params =
            OolParameters::new(&units, PlayerId(0), TerritoryId(0), &costs, &combat_value, &data)
                .with_hits(2);
        let order = OrderOfLossesCalculatorByUnitGroup::new(&params).calculate().unwrap();
        assert_eq!(order.len(), 2);
        assert!(order.iter().all(|u| u.unit_type == t.infantry));
    }

    #[test]
    fn test_apply_type_order_rejects_mismatch() {
        let units = pool(&[UnitTypeId::new(0)]);
        let refs: Vec<&Unit> = units.iter().collect();
        assert!(apply_type_order(&[UnitTypeId::new(1)], refs.clone()).is_none());
        assert!(apply_type_order(&[], refs).is_none());
    }
}
