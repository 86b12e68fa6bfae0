//! Top-level casualty selection for every kind of hit.
//!
//! The selector ranks the pool, builds a default selection, and only asks
//! the decision-maker when there is a real choice. Whatever comes back is
//! reconciled for multi-hit-point units and validated; a rejected answer is
//! reported to the decider and the whole selection is asked again, up to
//! [`CasualtyRules::max_selection_attempts`](crate::rules::CasualtyRules) times.

use std::collections::{HashMap, HashSet};

use super::category::categorize;
use super::details::CasualtyDetails;
use super::ool_cache::OolCache;
use super::order_of_losses::CasualtyOrderOfLosses;
use super::parameters::OolParameters;
use crate::combat_value::CombatValue;
use crate::decision::{CasualtyDecider, Dependents, SelectionRequest};
use crate::dice::HitsInfo;
use crate::error::{CasualtyError, Result};
use crate::game_data::GameData;
use crate::unit::{BattleId, PlayerId, TerritoryId, Unit, UnitId, UnitTypeId};

/// Inputs for one casualty selection.
#[derive(Clone, Copy)]
pub struct CasualtyRequest<'a> {
    /// Player taking the hits.
    pub player: PlayerId,
    /// Units that may be chosen.
    pub targets: &'a [Unit],
    /// Combat value of the targets' side.
    pub combat_value: &'a dyn CombatValue,
    /// Battle site.
    pub battlesite: TerritoryId,
    /// Hits to allocate.
    pub hits: HitsInfo<'a>,
    /// Multi-hit-point units may absorb single hits.
    pub allow_multiple_hits_per_unit: bool,
    /// No interactive player is attached.
    pub headless: bool,
    /// Battle being resolved.
    pub battle_id: Option<BattleId>,
}

impl<'a> CasualtyRequest<'a> {
    /// Request with single hits per unit, interactive, no battle id.
    #[must_use]
    pub const fn new(
        player: PlayerId,
        targets: &'a [Unit],
        combat_value: &'a dyn CombatValue,
        battlesite: TerritoryId,
        hits: HitsInfo<'a>,
    ) -> Self {
        Self {
            player,
            targets,
            combat_value,
            battlesite,
            hits,
            allow_multiple_hits_per_unit: false,
            headless: false,
            battle_id: None,
        }
    }

    /// Allow multi-hit-point units to absorb single hits.
    #[must_use]
    pub const fn with_multiple_hits_per_unit(mut self, allow: bool) -> Self {
        self.allow_multiple_hits_per_unit = allow;
        self
    }

    /// Mark the request as headless.
    #[must_use]
    pub const fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// Attach a battle id.
    #[must_use]
    pub const fn with_battle_id(mut self, battle_id: BattleId) -> Self {
        self.battle_id = Some(battle_id);
        self
    }
}

impl std::fmt::Debug for CasualtyRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasualtyRequest")
            .field("player", &self.player)
            .field("targets", &self.targets.len())
            .field("battlesite", &self.battlesite)
            .field("hits", &self.hits)
            .field("allow_multiple_hits_per_unit", &self.allow_multiple_hits_per_unit)
            .field("headless", &self.headless)
            .field("battle_id", &self.battle_id)
            .finish_non_exhaustive()
    }
}

enum Attempt {
    Accepted(CasualtyDetails),
    Rejected(String),
}

/// Chooses which units die or take damage.
#[derive(Debug, Clone, Copy)]
pub struct CasualtySelector<'a> {
    data: &'a GameData,
    ranking: CasualtyOrderOfLosses<'a>,
}

impl<'a> CasualtySelector<'a> {
    /// Selector using the process-wide ranking cache.
    #[must_use]
    pub fn new(data: &'a GameData) -> Self {
        Self::with_cache(data, OolCache::global())
    }

    /// Selector using a private ranking cache.
    #[must_use]
    pub const fn with_cache(data: &'a GameData, cache: &'a OolCache) -> Self {
        Self {
            data,
            ranking: CasualtyOrderOfLosses::new(cache),
        }
    }

    /// Game data this selector reads.
    #[must_use]
    pub const fn data(&self) -> &'a GameData {
        self.data
    }

    /// Select casualties for `request`, consulting `decider` when needed.
    ///
    /// # Errors
    ///
    /// Returns [`CasualtyError::SelectionRetriesExhausted`] if the decider
    /// keeps returning invalid selections, and propagates ranking errors.
    pub fn select_casualties(
        &self,
        request: &CasualtyRequest<'_>,
        decider: &mut dyn CasualtyDecider,
    ) -> Result<CasualtyDetails> {
        let attempts = self.data.rules.max_selection_attempts.max(1);
        for attempt in 1..=attempts {
            match self.attempt(request, decider)? {
                Attempt::Accepted(details) => {
                    tracing::debug!(
                        player = request.player.0,
                        killed = details.killed.len(),
                        damaged = details.damaged.len(),
                        forced = details.forced,
                        "Casualties selected"
                    );
                    return Ok(details);
                }
                Attempt::Rejected(message) => {
                    decider.report_error(&message);
                    if request.headless {
                        tracing::error!(attempt, %message, "Possible infinite loop: headless casualty selection rejected");
                    } else {
                        tracing::warn!(attempt, %message, "Casualty selection rejected");
                    }
                }
            }
        }
        Err(CasualtyError::SelectionRetriesExhausted { attempts })
    }

    fn attempt(
        &self,
        request: &CasualtyRequest<'_>,
        decider: &mut dyn CasualtyDecider,
    ) -> Result<Attempt> {
        let rules = &self.data.rules;
        let targets = request.targets;
        if targets.is_empty() {
            return Ok(Attempt::Accepted(CasualtyDetails::default()));
        }

        let dependents = if request.headless {
            Dependents::new()
        } else {
            dependents_of(targets)
        };

        if rules.edit_mode && !request.headless {
            let pool: Vec<&Unit> = targets.iter().collect();
            let empty = CasualtyDetails::default();
            let mut details = decider.select_casualties(&SelectionRequest {
                player: request.player,
                targets: &pool,
                dependents: &dependents,
                hits: 0,
                dice: request.hits.dice,
                default_casualties: &empty,
                battle_id: request.battle_id,
                battlesite: request.battlesite,
                allow_multiple_hits_per_unit: request.allow_multiple_hits_per_unit,
            });
            if rules.partial_amphibious_retreat {
                self.kill_amphibious_first(&mut details.killed, &pool)?;
            }
            return Ok(Attempt::Accepted(details));
        }

        if request.hits.dice.hits == 0 {
            return Ok(Attempt::Accepted(CasualtyDetails::new(true)));
        }
        let hits = if rules.transport_casualties_restricted {
            request.hits.extra_hits
        } else {
            request.hits.dice.hits
        };
        let hits = hits as usize;
        if hits == 0 {
            return Ok(Attempt::Accepted(CasualtyDetails::new(true)));
        }

        if !rules.edit_mode && self.is_homogeneous_one_hit_point(targets, &dependents)? {
            let killed = targets.iter().take(hits).map(|unit| unit.id).collect();
            return Ok(Attempt::Accepted(CasualtyDetails::from_lists(
                killed,
                Vec::new(),
                true,
            )));
        }

        let costs = self.data.costs_for(request.player);
        let params = OolParameters::new(
            targets,
            request.player,
            request.battlesite,
            &costs,
            request.combat_value,
            self.data,
        )
        .with_hits(hits);
        let mut sorted = self.ranking.sort_units_for_casualties_with_support(&params)?;
        if sorted.len() != targets.len() {
            return Err(CasualtyError::InvalidState(format!(
                "order of losses ranked {} of {} units",
                sorted.len(),
                targets.len()
            )));
        }
        if rules.transport_casualties_restricted {
            sorted = self.transports_last(sorted)?;
        }

        let allow_multiple = request.allow_multiple_hits_per_unit;
        let default = self.default_casualties(&sorted, hits, allow_multiple)?;
        let total_hit_points = if allow_multiple {
            total_hit_points_left(self.data, sorted.iter().copied())?
        } else {
            sorted.len()
        };

        let mut details = if hits >= total_hit_points {
            CasualtyDetails { forced: true, ..default }
        } else {
            decider.select_casualties(&SelectionRequest {
                player: request.player,
                targets: &sorted,
                dependents: &dependents,
                hits: hits as u32,
                dice: request.hits.dice,
                default_casualties: &default,
                battle_id: request.battle_id,
                battlesite: request.battlesite,
                allow_multiple_hits_per_unit: allow_multiple,
            })
        };

        if rules.partial_amphibious_retreat {
            self.kill_amphibious_first(&mut details.killed, &sorted)?;
        }

        let pool: HashMap<UnitId, &Unit> = sorted.iter().map(|unit| (unit.id, *unit)).collect();
        let mut hits_taken = details.killed.len();
        if allow_multiple {
            for &killed in &details.killed {
                let pending = details.damage_count(killed);
                if let Some(unit) = pool.get(&killed) {
                    let hit_points = self.data.unit_type(unit.unit_type)?.hit_points;
                    let absorbable = hit_points.saturating_sub(1 + unit.hits) as usize;
                    hits_taken += pending.min(absorbable);
                }
                details.damaged.retain(|&id| id != killed);
            }
        } else {
            details.damaged.clear();
        }

        if !rules.edit_mode {
            let expected = hits.min(total_hit_points);
            let actual = hits_taken + details.damaged.len();
            if actual != expected {
                return Ok(Attempt::Rejected(format!(
                    "Wrong number of casualties selected: {actual} hits taken, {expected} required"
                )));
            }
            if let Some(stranger) = details.units().find(|id| !pool.contains_key(id)) {
                return Ok(Attempt::Rejected(format!(
                    "Cannot remove unit {stranger:?}, it is not in the battle"
                )));
            }
        }

        Ok(Attempt::Accepted(details))
    }

    fn is_homogeneous_one_hit_point(&self, targets: &[Unit], dependents: &Dependents) -> Result<bool> {
        let categories = categorize(targets, Some(dependents), false);
        let [only] = categories.as_slice() else {
            return Ok(false);
        };
        let hit_points = self.data.unit_type(only.category.unit_type)?.hit_points;
        Ok(hit_points.saturating_sub(only.category.damage) <= 1)
    }

    /// Damage every unit that can take a non-lethal hit, then kill in
    /// ranking order, until `hits` are covered.
    /// Stable partition: every other unit, then transports.
    fn transports_last<'u>(&self, sorted: Vec<&'u Unit>) -> Result<Vec<&'u Unit>> {
        let mut ordered = Vec::with_capacity(sorted.len());
        let mut transports = Vec::new();
        for unit in sorted {
            if self.data.unit_type(unit.unit_type)?.is_transport() {
                transports.push(unit);
            } else {
                ordered.push(unit);
            }
        }
        ordered.extend(transports);
        Ok(ordered)
    }

    fn default_casualties(
        &self,
        sorted: &[&Unit],
        hits: usize,
        allow_multiple: bool,
    ) -> Result<CasualtyDetails> {
        let mut details = CasualtyDetails::new(false);
        let mut allocated = 0;

        if allow_multiple {
            for unit in sorted {
                if allocated >= hits {
                    break;
                }
                let hit_points = self.data.unit_type(unit.unit_type)?.hit_points;
                let absorbable = hit_points.saturating_sub(1 + unit.hits) as usize;
                for _ in 0..absorbable.min(hits - allocated) {
                    details.add_damaged(unit.id);
                    allocated += 1;
                }
            }
        }

        for unit in sorted {
            if allocated >= hits {
                break;
            }
            details.add_killed(unit.id);
            allocated += 1;
        }

        Ok(details)
    }

    /// Swap killed non-amphibious land units for surviving amphibious units
    /// of the same type, keeping their position in the killed list.
    fn kill_amphibious_first(&self, killed: &mut [UnitId], pool: &[&Unit]) -> Result<()> {
        let by_id: HashMap<UnitId, &Unit> = pool.iter().map(|unit| (unit.id, *unit)).collect();
        let mut amphibious: Vec<&Unit> = pool
            .iter()
            .copied()
            .filter(|unit| unit.was_amphibious && !killed.contains(&unit.id))
            .collect();
        let mut amphibious_types: HashSet<UnitTypeId> =
            amphibious.iter().map(|unit| unit.unit_type).collect();

        for slot in killed.iter_mut() {
            let Some(unit) = by_id.get(&*slot) else {
                continue;
            };
            if unit.was_amphibious
                || !self.data.unit_type(unit.unit_type)?.is_land()
                || !amphibious_types.contains(&unit.unit_type)
            {
                continue;
            }
            match amphibious.iter().position(|other| other.unit_type == unit.unit_type) {
                Some(index) => {
                    let substitute = amphibious.remove(index);
                    tracing::trace!(killed = ?unit.id, substitute = ?substitute.id, "Killing amphibious unit instead");
                    *slot = substitute.id;
                }
                None => {
                    amphibious_types.remove(&unit.unit_type);
                }
            }
        }
        Ok(())
    }
}

/// Cargo of every transporting unit in `targets`.
#[must_use]
pub fn dependents_of(targets: &[Unit]) -> Dependents {
    targets
        .iter()
        .filter(|unit| !unit.transporting.is_empty())
        .map(|unit| (unit.id, unit.transporting.clone()))
        .collect()
}

/// Hit points left across `units`, ignoring infrastructure.
///
/// # Errors
///
/// Returns an error if a unit references an unknown type.
pub fn total_hit_points_left<'a, I>(data: &GameData, units: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut total = 0;
    for unit in units {
        let unit_type = data.unit_type(unit.unit_type)?;
        if !unit_type.is_infrastructure() {
            total += unit.hit_points_left(unit_type) as usize;
        }
    }
    Ok(total)
}
