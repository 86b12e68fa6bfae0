//! Tie-break between unit groups of equal combat power.

use crate::game_data::CostMap;
use crate::unit::{PlayerId, UnitTypeId};

/// A unit type as fielded by one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitTypeByPlayer {
    /// Unit type.
    pub unit_type: UnitTypeId,
    /// Owner.
    pub owner: PlayerId,
}

/// Picks the cheapest group; equal costs keep candidate order.
#[derive(Debug, Clone, Copy)]
pub struct OolTieBreaker<'a> {
    costs: &'a CostMap,
}

impl<'a> OolTieBreaker<'a> {
    /// Create a tie breaker using `costs`.
    #[must_use]
    pub const fn new(costs: &'a CostMap) -> Self {
        Self { costs }
    }

    /// Choose one of `candidates`, or `None` if there are none.
    #[must_use]
    pub fn break_tie(&self, candidates: &[UnitTypeByPlayer]) -> Option<UnitTypeByPlayer> {
        candidates
            .iter()
            .min_by_key(|candidate| self.costs.cost(candidate.unit_type))
            .copied()
    }
}
