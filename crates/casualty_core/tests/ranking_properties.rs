//! Property tests for the order of losses and casualty selection.
//!
//! Pools are generated over the classic roster (without infrastructure),
//! with random damage, movement and amphibious flags.

use casualty_core::casualty::{
    total_hit_points_left, CasualtyOrderOfLosses, CasualtyRequest, CasualtySelector, OolCache,
    OolParameters,
};
use casualty_core::combat_value::{CombatModifiers, CombatSide, CombatValue, MainCombatValue};
use casualty_core::dice::{DiceRoll, HitsInfo};
use casualty_core::game_data::GameData;
use casualty_core::unit::{Unit, UnitId, UnitTypeId};
use casualty_test_utils::determinism::strategies::{
    arb_first_id, arb_hits, arb_pool_specs, build_pool,
};
use casualty_test_utils::fixtures::{classic_game_data, ClassicUnits, ATTACKER, BATTLESITE};
use casualty_test_utils::legacy::{legacy_order_of_losses, ranked_prefix_len};
use casualty_test_utils::scripted::ScriptedDecider;
use proptest::prelude::*;

fn roster(units: &ClassicUnits) -> Vec<UnitTypeId> {
    vec![
        units.infantry,
        units.artillery,
        units.armour,
        units.marine,
        units.fighter,
        units.bomber,
        units.battleship,
        units.transport,
    ]
}

fn modifiers(defending: bool, amphibious: bool) -> CombatModifiers {
    if defending {
        CombatModifiers::new(CombatSide::Defense)
    } else if amphibious {
        CombatModifiers::new(CombatSide::Offense).amphibious()
    } else {
        CombatModifiers::new(CombatSide::Offense)
    }
}

/// Full ranking of `pool` with `cache`, as unit ids.
fn rank(
    data: &GameData,
    pool: &[Unit],
    combat_value: &MainCombatValue<'_>,
    cache: &OolCache,
) -> Vec<UnitId> {
    let costs = data.costs_for(ATTACKER);
    let params = OolParameters::new(pool, ATTACKER, BATTLESITE, &costs, combat_value, data);
    CasualtyOrderOfLosses::new(cache)
        .sort_units_for_casualties_with_support(&params)
        .unwrap()
        .iter()
        .map(|unit| unit.id)
        .collect()
}

/// Power left in `pool` once `removed` are gone.
fn power_without(pool: &[Unit], removed: &[UnitId], combat_value: &MainCombatValue<'_>) -> u32 {
    let left: Vec<&Unit> = pool.iter().filter(|unit| !removed.contains(&unit.id)).collect();
    combat_value.evaluate(&left).unwrap().total_power()
}

/// Positions of ranked units within a pool whose ids start at `first_id`.
fn positions(order: &[UnitId], first_id: u64) -> Vec<u64> {
    order.iter().map(|id| id.0 - first_id).collect()
}

proptest! {
    /// Without support, marginal loss is each unit's own power, so the
    /// group engine agrees with the legacy ranking wherever it ranks.
    #[test]
    fn prop_group_engine_matches_legacy_without_support(
        specs in arb_pool_specs(8, 16),
        defending in any::<bool>(),
        amphibious in any::<bool>(),
    ) {
        let (mut data, units) = classic_game_data();
        data.support_rules.clear();
        let types = roster(&units);
        let pool = build_pool(&data, &types, &specs, ATTACKER, 1);
        let combat_value = MainCombatValue::new(&data, modifiers(defending, amphibious));

        let costs = data.costs_for(ATTACKER);
        let params = OolParameters::new(&pool, ATTACKER, BATTLESITE, &costs, &combat_value, &data);
        let reference: Vec<UnitId> = legacy_order_of_losses(&params)
            .unwrap()
            .iter()
            .map(|unit| unit.id)
            .collect();
        let ranked = rank(&data, &pool, &combat_value, &OolCache::new());
        let prefix = ranked_prefix_len(pool.len());

        prop_assert_eq!(positions(&ranked[..prefix], 1), positions(&reference[..prefix], 1));
    }

    /// Artillery support moves as units die; both rankings still leave the
    /// same power after every casualty the legacy ranking ranks.
    #[test]
    fn prop_group_engine_keeps_legacy_power_with_artillery_support(
        specs in arb_pool_specs(3, 14),
    ) {
        let (data, units) = classic_game_data();
        let types = [units.infantry, units.artillery, units.armour];
        let pool = build_pool(&data, &types, &specs, ATTACKER, 1);
        let combat_value = MainCombatValue::new(&data, modifiers(false, false));

        let costs = data.costs_for(ATTACKER);
        let params = OolParameters::new(&pool, ATTACKER, BATTLESITE, &costs, &combat_value, &data);
        let reference: Vec<UnitId> = legacy_order_of_losses(&params)
            .unwrap()
            .iter()
            .map(|unit| unit.id)
            .collect();
        let ranked = rank(&data, &pool, &combat_value, &OolCache::new());

        for step in 1..=ranked_prefix_len(pool.len()) {
            prop_assert_eq!(
                power_without(&pool, &ranked[..step], &combat_value),
                power_without(&pool, &reference[..step], &combat_value),
                "after {} casualties", step
            );
        }
    }

    /// Unit ids never influence the ranking.
    #[test]
    fn prop_ranking_ignores_unit_ids(
        specs in arb_pool_specs(8, 12),
        first_id in arb_first_id(),
        defending in any::<bool>(),
        amphibious in any::<bool>(),
    ) {
        let (data, units) = classic_game_data();
        let types = roster(&units);
        let combat_value = MainCombatValue::new(&data, modifiers(defending, amphibious));

        let original = build_pool(&data, &types, &specs, ATTACKER, 1);
        let relabelled = build_pool(&data, &types, &specs, ATTACKER, first_id);

        let a = rank(&data, &original, &combat_value, &OolCache::new());
        let b = rank(&data, &relabelled, &combat_value, &OolCache::new());

        prop_assert_eq!(positions(&a, 1), positions(&b, first_id));
    }

    /// A cache hit maps onto the same instances a fresh ranking picks.
    #[test]
    fn prop_cached_ranking_equals_fresh(
        specs in arb_pool_specs(8, 12),
        first_id in arb_first_id(),
        defending in any::<bool>(),
        amphibious in any::<bool>(),
    ) {
        let (data, units) = classic_game_data();
        let types = roster(&units);
        let combat_value = MainCombatValue::new(&data, modifiers(defending, amphibious));
        let cache = OolCache::new();

        let warm = build_pool(&data, &types, &specs, ATTACKER, 1);
        rank(&data, &warm, &combat_value, &cache);
        prop_assert!(!cache.is_empty());

        let pool = build_pool(&data, &types, &specs, ATTACKER, first_id);
        let cached = rank(&data, &pool, &combat_value, &cache);
        let fresh = rank(&data, &pool, &combat_value, &OolCache::new());

        prop_assert_eq!(positions(&cached, first_id), positions(&fresh, first_id));
    }

    /// Accepted selections account for exactly the hits the pool can take.
    #[test]
    fn prop_selection_accounts_for_every_hit(
        specs in arb_pool_specs(8, 12),
        hits in arb_hits(),
        allow_multiple in any::<bool>(),
        defending in any::<bool>(),
    ) {
        let (data, units) = classic_game_data();
        let types = roster(&units);
        let pool = build_pool(&data, &types, &specs, ATTACKER, 1);
        let combat_value = MainCombatValue::new(&data, modifiers(defending, false));
        let dice = DiceRoll::with_hits(hits);
        let request =
            CasualtyRequest::new(ATTACKER, &pool, &combat_value, BATTLESITE, HitsInfo::new(&dice))
                .with_multiple_hits_per_unit(allow_multiple);

        let details = CasualtySelector::with_cache(&data, &OolCache::new())
            .select_casualties(&request, &mut ScriptedDecider::accepting())
            .unwrap();

        let hits = hits as usize;
        if allow_multiple {
            let killed: Vec<&Unit> = pool
                .iter()
                .filter(|unit| details.is_killed(unit.id))
                .collect();
            let taken = total_hit_points_left(&data, killed).unwrap() + details.damaged.len();
            let capacity = total_hit_points_left(&data, &pool).unwrap();
            prop_assert_eq!(taken, hits.min(capacity));
        } else {
            prop_assert_eq!(details.killed.len(), hits.min(pool.len()));
            prop_assert!(details.damaged.is_empty());
        }

        // No unit is killed twice.
        let mut killed = details.killed.clone();
        killed.sort_unstable();
        killed.dedup();
        prop_assert_eq!(killed.len(), details.killed.len());
    }
}
