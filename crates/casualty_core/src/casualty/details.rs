//! The result of a casualty selection.

use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// Killed and damaged units chosen for a set of hits.
///
/// A unit appears in `damaged` once per hit it absorbs without dying.
/// `forced` is set when the selection was computed automatically rather
/// than confirmed by a decision-maker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CasualtyDetails {
    /// Units destroyed.
    pub killed: Vec<UnitId>,
    /// Units taking a non-lethal hit, once per hit.
    pub damaged: Vec<UnitId>,
    /// Computed without consulting a decision-maker.
    pub forced: bool,
}

impl CasualtyDetails {
    /// Empty selection.
    #[must_use]
    pub const fn new(forced: bool) -> Self {
        Self {
            killed: Vec::new(),
            damaged: Vec::new(),
            forced,
        }
    }

    /// Selection with the given lists.
    #[must_use]
    pub const fn from_lists(killed: Vec<UnitId>, damaged: Vec<UnitId>, forced: bool) -> Self {
        Self {
            killed,
            damaged,
            forced,
        }
    }

    /// Mark a unit as killed.
    pub fn add_killed(&mut self, unit: UnitId) {
        self.killed.push(unit);
    }

    /// Record one non-lethal hit on a unit.
    pub fn add_damaged(&mut self, unit: UnitId) {
        self.damaged.push(unit);
    }

    /// Killed plus damaged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.killed.len() + self.damaged.len()
    }

    /// Nothing selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.killed.is_empty() && self.damaged.is_empty()
    }

    /// Times `unit` appears in the damaged list.
    #[must_use]
    pub fn damage_count(&self, unit: UnitId) -> usize {
        self.damaged.iter().filter(|&&id| id == unit).count()
    }

    /// Whether `unit` is killed.
    #[must_use]
    pub fn is_killed(&self, unit: UnitId) -> bool {
        self.killed.contains(&unit)
    }

    /// Every unit mentioned, killed first.
    pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.killed.iter().chain(self.damaged.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut details = CasualtyDetails::new(false);
        assert!(details.is_empty());
        details.add_killed(UnitId(1));
        details.add_damaged(UnitId(2));
        details.add_damaged(UnitId(2));

        assert_eq!(details.len(), 3);
        assert_eq!(details.damage_count(UnitId(2)), 2);
        assert!(details.is_killed(UnitId(1)));
        assert_eq!(details.units().collect::<Vec<_>>(), vec![UnitId(1), UnitId(2), UnitId(2)]);
    }
}
