//! Process-wide memoization of order-of-losses rankings.
//!
//! Keys are structured: player, battle site, side flags and the sorted
//! type multisets of the pool, its amphibious subset and the opposing
//! units providing enemy support. Values are the casualty order as unit
//! types. The cache only saves work; clearing it at
//! any time changes nothing but speed.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use crate::unit::{PlayerId, TerritoryId, Unit, UnitTypeId};

/// Sorted count of units per type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeMultiset(Vec<(UnitTypeId, u32)>);

impl TypeMultiset {
    /// Count the types of `units`.
    pub fn from_units<'a, I>(units: I) -> Self
    where
        I: IntoIterator<Item = &'a Unit>,
    {
        let mut multiset = Self::default();
        for unit in units {
            multiset.add(unit.unit_type);
        }
        multiset
    }

    fn add(&mut self, unit_type: UnitTypeId) {
        match self.0.binary_search_by_key(&unit_type, |&(t, _)| t) {
            Ok(index) => self.0[index].1 += 1,
            Err(index) => self.0.insert(index, (unit_type, 1)),
        }
    }

    /// Remove one unit of `unit_type`. Returns false if none was present.
    pub fn remove_one(&mut self, unit_type: UnitTypeId) -> bool {
        let Ok(index) = self.0.binary_search_by_key(&unit_type, |&(t, _)| t) else {
            return false;
        };
        if self.0[index].1 > 1 {
            self.0[index].1 -= 1;
        } else {
            self.0.remove(index);
        }
        true
    }

    /// Units of `unit_type`.
    #[must_use]
    pub fn count(&self, unit_type: UnitTypeId) -> u32 {
        self.0
            .binary_search_by_key(&unit_type, |&(t, _)| t)
            .map_or(0, |index| self.0[index].1)
    }

    /// Total units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().map(|&(_, count)| count as usize).sum()
    }

    /// No units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Context signature of a ranking.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OolCacheKey {
    /// Player owning the pool.
    pub player: PlayerId,
    /// Battle site.
    pub battlesite: TerritoryId,
    /// Pool is defending.
    pub defending: bool,
    /// Amphibious assault.
    pub amphibious: bool,
    /// Types in the pool.
    pub targets: TypeMultiset,
    /// Types in the amphibious subset.
    pub amphibious_targets: TypeMultiset,
    /// Opposing units that provide active enemy support.
    pub enemy_support: TypeMultiset,
}

impl OolCacheKey {
    /// Key for the pool left after removing one unit of `unit_type`.
    #[must_use]
    pub fn without(&self, unit_type: UnitTypeId) -> Self {
        let mut next = self.clone();
        next.targets.remove_one(unit_type);
        if next.amphibious_targets.count(unit_type) > next.targets.count(unit_type) {
            next.amphibious_targets.remove_one(unit_type);
        }
        next
    }
}

/// Thread-safe ranking cache.
#[derive(Debug, Default)]
pub struct OolCache {
    entries: RwLock<HashMap<OolCacheKey, Vec<UnitTypeId>>>,
}

static GLOBAL_OOL_CACHE: LazyLock<OolCache> = LazyLock::new(OolCache::new);

impl OolCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_OOL_CACHE
    }

    /// Cached order for `key`.
    #[must_use]
    pub fn get(&self, key: &OolCacheKey) -> Option<Vec<UnitTypeId>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store `order` for `key` and for every pool reached by removing its
    /// prefix one unit at a time.
    pub fn insert_with_suffixes(&self, key: OolCacheKey, order: &[UnitTypeId]) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut key = key;
        for (index, &unit_type) in order.iter().enumerate() {
            let next = key.without(unit_type);
            entries.insert(key, order[index..].to_vec());
            key = next;
        }
    }

    /// Number of cached keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Invalidate the process-wide ranking cache, e.g. after game data reloads.
pub fn clear_ool_cache() {
    OolCache::global().clear();
    tracing::debug!("Order of losses cache cleared");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitId;

    fn unit(id: u64, unit_type: u16) -> Unit {
        Unit::new(UnitId(id), PlayerId(0), UnitTypeId::new(unit_type))
    }

    fn key(targets: &[Unit], amphibious: &[Unit]) -> OolCacheKey {
        OolCacheKey {
            player: PlayerId(0),
            battlesite: TerritoryId(1),
            defending: false,
            amphibious: !amphibious.is_empty(),
            targets: TypeMultiset::from_units(targets),
            amphibious_targets: TypeMultiset::from_units(amphibious),
            enemy_support: TypeMultiset::default(),
        }
    }

    #[test]
    fn test_multiset_ignores_order_and_identity() {
        let a = TypeMultiset::from_units(&[unit(1, 2), unit(2, 0), unit(3, 2)]);
        let b = TypeMultiset::from_units(&[unit(9, 2), unit(8, 2), unit(7, 0)]);
        assert_eq!(a, b);
        assert_eq!(a.count(UnitTypeId::new(2)), 2);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_suffixes_are_back_filled() {
        let cache = OolCache::new();
        let targets = [unit(1, 0), unit(2, 1), unit(3, 1)];
        let order = [UnitTypeId::new(0), UnitTypeId::new(1), UnitTypeId::new(1)];
        cache.insert_with_suffixes(key(&targets, &[]), &order);

        assert_eq!(cache.len(), 3);
        let tail = key(&[unit(5, 1), unit(6, 1)], &[]);
        assert_eq!(cache.get(&tail), Some(order[1..].to_vec()));
        let last = key(&[unit(7, 1)], &[]);
        assert_eq!(cache.get(&last), Some(vec![UnitTypeId::new(1)]));
    }

    #[test]
    fn test_amphibious_subset_shrinks_with_pool() {
        let targets = [unit(1, 0), unit(2, 0)];
        let amphibious = [unit(2, 0)];
        let full = key(&targets, &amphibious);

        let one_left = full.without(UnitTypeId::new(0));
        assert_eq!(one_left.targets.count(UnitTypeId::new(0)), 1);
        assert_eq!(one_left.amphibious_targets.count(UnitTypeId::new(0)), 1);

        let none_left = one_left.without(UnitTypeId::new(0));
        assert!(none_left.targets.is_empty());
        assert!(none_left.amphibious_targets.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = OolCache::new();
        cache.insert_with_suffixes(key(&[unit(1, 0)], &[]), &[UnitTypeId::new(0)]);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
