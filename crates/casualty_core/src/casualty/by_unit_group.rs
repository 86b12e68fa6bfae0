//! Group-based order of losses.
//!
//! Units are grouped by type and owner. Each step measures, for every group,
//! how much total power the pool loses when that group's next instance is
//! removed, with support re-allocated among the survivors. The group losing
//! the least goes next; equal losses go to the cheaper group.

use super::parameters::OolParameters;
use super::tie_breaker::{OolTieBreaker, UnitTypeByPlayer};
use crate::error::{CasualtyError, Result};
use crate::unit::Unit;

/// Ranks a pool weakest-first, one unit per step.
#[derive(Debug)]
pub struct OrderOfLossesCalculatorByUnitGroup<'p, 'a> {
    params: &'p OolParameters<'a>,
}

impl<'p, 'a> OrderOfLossesCalculatorByUnitGroup<'p, 'a> {
    /// Create a calculator for `params`.
    #[must_use]
    pub const fn new(params: &'p OolParameters<'a>) -> Self {
        Self { params }
    }

    /// Casualty order, weakest first, up to `params.hits` units.
    ///
    /// # Errors
    ///
    /// Returns [`CasualtyError::OrderOfLossesCorrupted`] if a chosen group
    /// has no instance left in the pool, or any error from the combat value.
    pub fn calculate(&self) -> Result<Vec<&'a Unit>> {
        let mut remaining = self.params.instance_order();
        let limit = self.params.hits.min(remaining.len());
        let tie_breaker = OolTieBreaker::new(self.params.costs);
        let mut order = Vec::with_capacity(limit);

        while order.len() < limit {
            let total = self.params.combat_value.evaluate(&remaining)?.total_power();

            // Power lost by removing each group's next instance.
            let mut groups: Vec<(UnitTypeByPlayer, u32)> = Vec::new();
            for (index, unit) in remaining.iter().enumerate() {
                let group = group_of(unit);
                if groups.iter().any(|(g, _)| *g == group) {
                    continue;
                }
                let mut without = remaining.clone();
                without.remove(index);
                let left = self.params.combat_value.evaluate(&without)?.total_power();
                groups.push((group, total.saturating_sub(left)));
            }

            let weakest = groups.iter().map(|&(_, power)| power).min().unwrap_or(0);
            let tied: Vec<UnitTypeByPlayer> = groups
                .iter()
                .filter(|&&(_, power)| power == weakest)
                .map(|&(group, _)| group)
                .collect();
            let chosen = tie_breaker.break_tie(&tied).ok_or_else(|| {
                CasualtyError::InvalidState("order of losses found no unit groups".to_string())
            })?;

            order.push(take_instance(&mut remaining, chosen)?);
        }

        tracing::trace!(
            pool = self.params.targets.len(),
            ranked = order.len(),
            "Group order of losses computed"
        );
        Ok(order)
    }
}

fn group_of(unit: &Unit) -> UnitTypeByPlayer {
    UnitTypeByPlayer {
        unit_type: unit.unit_type,
        owner: unit.owner,
    }
}

/// Remove and return the next instance of `chosen`.
///
/// Groups are collected from `remaining` in the same step, so a miss means
/// the group bookkeeping and the pool have diverged.
fn take_instance<'a>(remaining: &mut Vec<&'a Unit>, chosen: UnitTypeByPlayer) -> Result<&'a Unit> {
    let index = remaining
        .iter()
        .position(|unit| group_of(unit) == chosen)
        .ok_or(CasualtyError::OrderOfLossesCorrupted {
            unit_type: chosen.unit_type,
            owner: chosen.owner,
        })?;
    Ok(remaining.remove(index))
}
