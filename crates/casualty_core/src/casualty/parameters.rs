//! Input bundle shared by the ranking algorithms.

use std::cmp::Reverse;
use std::collections::HashSet;

use super::ool_cache::{OolCacheKey, TypeMultiset};
use crate::combat_value::{CombatValue, SupportTarget};
use crate::game_data::{CostMap, GameData};
use crate::unit::{PlayerId, TerritoryId, Unit, UnitId};

/// Everything a ranking depends on.
///
/// A ranking is a pure function of these values (modulo the cache). The
/// opposing pool reaches the ranking through the combat value.
#[derive(Clone, Copy)]
pub struct OolParameters<'a> {
    /// Units to rank.
    pub targets: &'a [Unit],
    /// Owner of the pool.
    pub player: PlayerId,
    /// Battle site.
    pub battlesite: TerritoryId,
    /// Production costs.
    pub costs: &'a CostMap,
    /// Combat value calculator, carrying side and amphibious flags.
    pub combat_value: &'a dyn CombatValue,
    /// Game data.
    pub data: &'a GameData,
    /// Casualties wanted; the ranking may stop after this many.
    pub hits: usize,
}

impl std::fmt::Debug for OolParameters<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OolParameters")
            .field("targets", &self.targets.len())
            .field("player", &self.player)
            .field("battlesite", &self.battlesite)
            .field("modifiers", self.combat_value.modifiers())
            .field("hits", &self.hits)
            .finish_non_exhaustive()
    }
}

impl<'a> OolParameters<'a> {
    /// Parameters ranking the whole pool.
    #[must_use]
    pub fn new(
        targets: &'a [Unit],
        player: PlayerId,
        battlesite: TerritoryId,
        costs: &'a CostMap,
        combat_value: &'a dyn CombatValue,
        data: &'a GameData,
    ) -> Self {
        Self {
            targets,
            player,
            battlesite,
            costs,
            combat_value,
            data,
            hits: targets.len(),
        }
    }

    /// Stop ranking after `hits` casualties.
    #[must_use]
    pub const fn with_hits(mut self, hits: usize) -> Self {
        self.hits = hits;
        self
    }

    /// Units that landed from the sea.
    pub fn amphibious_land_attackers(&self) -> impl Iterator<Item = &'a Unit> {
        self.targets.iter().filter(|unit| unit.was_amphibious)
    }

    /// Cache key for this context.
    #[must_use]
    pub fn cache_key(&self) -> OolCacheKey {
        let modifiers = self.combat_value.modifiers();
        let enemy_support = self.combat_value.enemy_units().iter().filter(|unit| {
            self.data.support_rules.iter().any(|rule| {
                rule.target == SupportTarget::Enemy
                    && rule.applies(modifiers.side)
                    && rule.provider == unit.unit_type
            })
        });
        OolCacheKey {
            player: self.player,
            battlesite: self.battlesite,
            defending: modifiers.is_defending(),
            amphibious: modifiers.amphibious,
            targets: TypeMultiset::from_units(self.targets),
            amphibious_targets: TypeMultiset::from_units(self.amphibious_land_attackers()),
            enemy_support: TypeMultiset::from_units(enemy_support),
        }
    }

    /// Pool in the order instances of one type are taken: outside the
    /// amphibious subset first, then most damaged, then least movement,
    /// then pool order.
    #[must_use]
    pub fn instance_order(&self) -> Vec<&'a Unit> {
        let amphibious: HashSet<UnitId> =
            self.amphibious_land_attackers().map(|unit| unit.id).collect();
        let mut units: Vec<&'a Unit> = self.targets.iter().collect();
        units.sort_by_key(|unit| {
            (
                amphibious.contains(&unit.id),
                Reverse(unit.hits),
                unit.movement_left,
            )
        });
        units
    }
}
