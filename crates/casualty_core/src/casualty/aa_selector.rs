//! Casualties from anti-air fire.
//!
//! Aircraft hit by AA are resolved automatically unless the rules let the
//! hit player choose. Targets are flattened to one entry per hit point they
//! can absorb, and random indices address that flattened list. Low-luck
//! games use [`LowLuckTargetGroups`] when the arithmetic allows it.

use super::details::CasualtyDetails;
use super::low_luck::LowLuckTargetGroups;
use super::ool_cache::OolCache;
use super::selector::{CasualtyRequest, CasualtySelector};
use crate::combat_value::CombatValue;
use crate::decision::CasualtyDecider;
use crate::dice::{DiceRoll, HitsInfo};
use crate::error::{CasualtyError, Result};
use crate::game_data::GameData;
use crate::random::RandomSource;
use crate::unit::{BattleId, PlayerId, TerritoryId, Unit};

const AA_DRAW_LABEL: &str = "Deciding which planes should die due to AA fire";

/// Inputs for resolving one AA volley.
#[derive(Clone, Copy)]
pub struct AaCasualtyRequest<'a> {
    /// Aircraft fired upon.
    pub planes: &'a [Unit],
    /// AA units that fired.
    pub defending_aa: &'a [Unit],
    /// Combat value of the aircraft's side.
    pub planes_combat_value: &'a dyn CombatValue,
    /// Combat value of the AA fire.
    pub aa_combat_value: &'a dyn CombatValue,
    /// The AA dice.
    pub dice: &'a DiceRoll,
    /// Owner of the aircraft.
    pub hit_player: PlayerId,
    /// Battle being resolved.
    pub battle_id: Option<BattleId>,
    /// Battle site.
    pub battlesite: TerritoryId,
}

impl std::fmt::Debug for AaCasualtyRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AaCasualtyRequest")
            .field("planes", &self.planes.len())
            .field("defending_aa", &self.defending_aa.len())
            .field("dice", self.dice)
            .field("hit_player", &self.hit_player)
            .field("battle_id", &self.battle_id)
            .field("battlesite", &self.battlesite)
            .finish_non_exhaustive()
    }
}

/// Chooses aircraft lost to AA fire.
#[derive(Debug, Clone, Copy)]
pub struct AaCasualtySelector<'a> {
    selector: CasualtySelector<'a>,
}

impl<'a> AaCasualtySelector<'a> {
    /// AA selector using the process-wide ranking cache.
    #[must_use]
    pub fn new(data: &'a GameData) -> Self {
        Self {
            selector: CasualtySelector::new(data),
        }
    }

    /// AA selector using a private ranking cache.
    #[must_use]
    pub const fn with_cache(data: &'a GameData, cache: &'a OolCache) -> Self {
        Self {
            selector: CasualtySelector::with_cache(data, cache),
        }
    }

    /// Resolve AA hits on `request.planes`.
    ///
    /// # Errors
    ///
    /// Returns [`CasualtyError::AaCasualtyCountMismatch`] if the selection
    /// does not account for every hit, and propagates errors from the random
    /// source, the combat values, or the interactive selector.
    pub fn get_aa_casualties(
        &self,
        request: &AaCasualtyRequest<'_>,
        random: &mut dyn RandomSource,
        decider: &mut dyn CasualtyDecider,
    ) -> Result<CasualtyDetails> {
        let data = self.selector.data();
        if request.planes.is_empty() {
            return Ok(CasualtyDetails::default());
        }

        let allow_multiple = self.aa_damages_targets(request.defending_aa)?;

        if data.rules.edit_mode || data.rules.choose_aa_casualties {
            let interactive = CasualtyRequest::new(
                request.hit_player,
                request.planes,
                request.planes_combat_value,
                request.battlesite,
                HitsInfo::new(request.dice),
            )
            .with_multiple_hits_per_unit(allow_multiple);
            let interactive = match request.battle_id {
                Some(battle_id) => interactive.with_battle_id(battle_id),
                None => interactive,
            };
            return self.selector.select_casualties(&interactive, decider);
        }

        let hits = request.dice.hits as usize;
        if hits == 0 {
            return Ok(CasualtyDetails::new(true));
        }

        let targets = self.flatten(request.planes, allow_multiple)?;
        let low_luck_group = if data.rules.low_luck_for_aa() {
            self.low_luck_group_size(request, targets.len(), hits)?
        } else {
            None
        };

        let details = match low_luck_group {
            Some(group_size) => {
                tracing::debug!(group_size, hits, targets = targets.len(), "Low luck AA casualties");
                self.low_luck_casualties(&targets, group_size, hits, allow_multiple, random)?
            }
            None => {
                tracing::debug!(hits, targets = targets.len(), "Random AA casualties");
                self.random_casualties(&targets, request.dice, allow_multiple, random)?
            }
        };

        let expected = hits.min(targets.len());
        if details.len() != expected {
            return Err(CasualtyError::AaCasualtyCountMismatch {
                expected,
                actual: details.len(),
            });
        }
        Ok(details)
    }

    /// AA hits damage rather than destroy only if every firing unit does so.
    fn aa_damages_targets(&self, defending_aa: &[Unit]) -> Result<bool> {
        if defending_aa.is_empty() {
            return Ok(false);
        }
        for unit in defending_aa {
            let unit_type = self.selector.data().unit_type(unit.unit_type)?;
            if !unit_type.aa.as_ref().is_some_and(|aa| aa.damages_targets) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// One entry per hit point a plane can absorb, or one per plane.
    fn flatten<'u>(&self, planes: &'u [Unit], allow_multiple: bool) -> Result<Vec<&'u Unit>> {
        let mut targets = Vec::with_capacity(planes.len());
        for plane in planes {
            let entries = if allow_multiple {
                let unit_type = self.selector.data().unit_type(plane.unit_type)?;
                plane.hit_points_left(unit_type).max(1)
            } else {
                1
            };
            targets.extend(std::iter::repeat(plane).take(entries as usize));
        }
        Ok(targets)
    }

    /// Group size for low-luck grouping, or `None` when the shared-strength
    /// grouping does not apply and random selection must be used.
    fn low_luck_group_size(
        &self,
        request: &AaCasualtyRequest<'_>,
        target_count: usize,
        hits: usize,
    ) -> Result<Option<usize>> {
        let aa: Vec<&Unit> = request.defending_aa.iter().collect();
        let evaluation = request.aa_combat_value.evaluate(&aa)?;
        let mut strengths = aa
            .iter()
            .map(|unit| evaluation.strength_and_rolls(unit.id).strength);
        let Some(strength) = strengths.next() else {
            return Ok(None);
        };
        if strength <= 0 || strengths.any(|other| other != strength) {
            return Ok(None);
        }

        let dice_sides = request.aa_combat_value.dice_sides();
        let strength = strength.unsigned_abs();
        if dice_sides % strength != 0 {
            return Ok(None);
        }
        let group_size = (dice_sides / strength) as usize;
        if hits > target_count.div_ceil(group_size) {
            return Ok(None);
        }
        Ok(Some(group_size))
    }

    fn low_luck_casualties(
        &self,
        targets: &[&Unit],
        group_size: usize,
        hits: usize,
        allow_multiple: bool,
        random: &mut dyn RandomSource,
    ) -> Result<CasualtyDetails> {
        let groups = LowLuckTargetGroups::new(targets, group_size);
        let guaranteed = groups.guaranteed_hits();
        let remainder = groups.remainder_units();
        let remainder_groups = remainder.len().div_ceil(group_size);

        let picked = if hits < guaranteed.len() + remainder_groups {
            // One candidate per group, partial groups sampled from the
            // remainder, then the hits are drawn among the candidates.
            let mut candidates = guaranteed;
            match remainder {
                [] => {}
                [only] => candidates.push(*only),
                _ => candidates.extend(pick_random(remainder, remainder_groups, random)?),
            }
            pick_random(&candidates, hits, random)?
        } else {
            let leftover = hits - guaranteed.len();
            let mut picked = guaranteed;
            if leftover == remainder.len() {
                picked.extend_from_slice(remainder);
            } else if leftover > 0 {
                picked.extend(pick_random(remainder, leftover, random)?);
            }
            picked
        };

        let mut details = CasualtyDetails::new(true);
        for unit in picked {
            self.assign_hit(&mut details, unit, allow_multiple)?;
        }
        Ok(details)
    }

    fn random_casualties(
        &self,
        targets: &[&Unit],
        dice: &DiceRoll,
        allow_multiple: bool,
        random: &mut dyn RandomSource,
    ) -> Result<CasualtyDetails> {
        let hits = dice.hits as usize;
        let mut details = CasualtyDetails::new(true);

        if dice.rolls.len() == targets.len() && hits < targets.len() {
            // Each target already has its own die.
            for (die, unit) in dice.rolls.iter().zip(targets) {
                if die.is_hit() {
                    self.assign_hit(&mut details, unit, allow_multiple)?;
                }
            }
        } else if hits >= targets.len() {
            for unit in targets {
                self.assign_hit(&mut details, unit, allow_multiple)?;
            }
        } else {
            for unit in pick_random(targets, hits, random)? {
                self.assign_hit(&mut details, unit, allow_multiple)?;
            }
        }

        Ok(details)
    }

    /// Damage the unit while it can survive another hit, otherwise kill it.
    fn assign_hit(
        &self,
        details: &mut CasualtyDetails,
        unit: &Unit,
        allow_multiple: bool,
    ) -> Result<()> {
        let hit_points_left = unit.hit_points_left(self.selector.data().unit_type(unit.unit_type)?);
        if allow_multiple && details.damage_count(unit.id) + 1 < hit_points_left as usize {
            details.add_damaged(unit.id);
        } else {
            details.add_killed(unit.id);
        }
        Ok(())
    }
}

/// Draw `count` distinct entries of `list` in one batch.
fn pick_random<'u>(
    list: &[&'u Unit],
    count: usize,
    random: &mut dyn RandomSource,
) -> Result<Vec<&'u Unit>> {
    let count = count.min(list.len());
    if count == 0 {
        return Ok(Vec::new());
    }
    let values = random.random_indices(list.len() as u32, count as u32, AA_DRAW_LABEL)?;
    if values.len() != count {
        return Err(CasualtyError::RandomSource(format!(
            "asked for {count} values, got {}",
            values.len()
        )));
    }
    Ok(unique_indices(&values, list.len())
        .into_iter()
        .map(|index| list[index])
        .collect())
}

/// Map raw values onto distinct indices, stepping forward past taken ones.
fn unique_indices(values: &[u32], len: usize) -> Vec<usize> {
    let mut taken = vec![false; len];
    values
        .iter()
        .map(|&value| {
            let mut index = value as usize % len;
            while taken[index] {
                index = (index + 1) % len;
            }
            taken[index] = true;
            index
        })
        .collect()
}
