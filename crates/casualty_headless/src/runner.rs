//! Headless battle runner.
//!
//! Spawns the units a [`BattleSetup`] describes, rolls dice for the firing
//! side through the [`RandomSource`] (unless the hits are fixed), and hands
//! each round to the casualty selectors. Killed units leave the pool and
//! damaged units keep their damage into the next round.

use std::hash::{Hash, Hasher};

use casualty_core::casualty::{
    AaCasualtyRequest, AaCasualtySelector, CasualtyDetails, CasualtyOrderOfLosses,
    CasualtyRequest, CasualtySelector, OolParameters,
};
use casualty_core::combat_value::{
    AaCombatValue, CombatEvaluation, CombatModifiers, CombatSide, CombatValue, MainCombatValue,
};
use casualty_core::decision::CasualtyDecider;
use casualty_core::dice::{DiceRoll, Die, DieType, HitsInfo};
use casualty_core::error::CasualtyError;
use casualty_core::game_data::GameData;
use casualty_core::random::RandomSource;
use casualty_core::unit::{BattleId, PlayerId, TerritoryId, Unit, UnitId};
use serde::{Deserialize, Serialize};

use crate::scenario::{player_id, BattleKind, BattleSetup, Scenario, ScenarioError, UnitPlacement};

/// Outcome of one round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, from 1.
    pub round: u32,
    /// Hits scored against the pool.
    pub hits: u32,
    /// Units removed.
    pub killed: Vec<u64>,
    /// Units damaged, once per hit absorbed.
    pub damaged: Vec<u64>,
    /// No choice was possible.
    pub forced: bool,
}

/// Outcome of one battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleReport {
    /// Battle name.
    pub name: String,
    /// Rounds fought.
    pub rounds: Vec<RoundReport>,
    /// Targets left standing.
    pub survivors: Vec<u64>,
}

/// Outcome of a whole scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario: String,
    /// Seed of the random source, if known.
    pub seed: Option<u64>,
    /// Battles in scenario order.
    pub battles: Vec<BattleReport>,
}

impl ScenarioReport {
    /// Hash of the resolved outcome, ignoring the seed.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.scenario.hash(&mut hasher);
        self.battles.hash(&mut hasher);
        hasher.finish()
    }
}

/// One unit in a printed order of losses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedUnit {
    /// Position, weakest first, from 1.
    pub position: usize,
    /// Unit id.
    pub id: u64,
    /// Unit type name.
    pub unit_type: String,
    /// Damage taken.
    pub hits: u32,
}

/// Resolves battles against one set of game data.
#[derive(Debug, Clone, Copy)]
pub struct BattleRunner<'a> {
    data: &'a GameData,
    selector: CasualtySelector<'a>,
    aa: AaCasualtySelector<'a>,
}

impl<'a> BattleRunner<'a> {
    /// Runner using the process-wide ranking cache.
    #[must_use]
    pub fn new(data: &'a GameData) -> Self {
        Self {
            data,
            selector: CasualtySelector::new(data),
            aa: AaCasualtySelector::new(data),
        }
    }

    /// Fight every round of `setup`.
    pub fn run_battle(
        &self,
        setup: &BattleSetup,
        random: &mut dyn RandomSource,
        decider: &mut dyn CasualtyDecider,
    ) -> Result<BattleReport, ScenarioError> {
        let hit_player = player_id(self.data, &setup.hit_player)?;
        let firing_player = self.firing_player(setup, hit_player)?;
        let mut next_id = 1;
        let mut targets = spawn_units(self.data, &setup.targets, hit_player, &mut next_id)?;
        let firing = spawn_units(self.data, &setup.firing, firing_player, &mut next_id)?;

        let mut rounds = Vec::new();
        for round in 1..=setup.rounds.max(1) {
            if targets.is_empty() {
                break;
            }
            let dice = self.roll(setup, &targets, &firing, random)?;
            let details = match setup.kind {
                BattleKind::Main => {
                    self.resolve_main(setup, hit_player, round, &targets, &firing, &dice, decider)?
                }
                BattleKind::AntiAir => self.resolve_anti_air(
                    setup, hit_player, round, &targets, &firing, &dice, random, decider,
                )?,
            };

            for unit in &mut targets {
                unit.hits += details.damage_count(unit.id) as u32;
            }
            targets.retain(|unit| !details.is_killed(unit.id));

            tracing::info!(
                battle = %setup.name,
                round,
                hits = dice.hits,
                killed = details.killed.len(),
                damaged = details.damaged.len(),
                remaining = targets.len(),
                "Round resolved"
            );
            rounds.push(RoundReport {
                round,
                hits: dice.hits,
                killed: details.killed.iter().map(|id| id.0).collect(),
                damaged: details.damaged.iter().map(|id| id.0).collect(),
                forced: details.forced,
            });
        }

        Ok(BattleReport {
            name: setup.name.clone(),
            rounds,
            survivors: targets.iter().map(|unit| unit.id.0).collect(),
        })
    }

    /// The full order of losses for the targets of `setup`.
    pub fn rank(&self, setup: &BattleSetup) -> Result<Vec<RankedUnit>, ScenarioError> {
        let hit_player = player_id(self.data, &setup.hit_player)?;
        let firing_player = self.firing_player(setup, hit_player)?;
        let mut next_id = 1;
        let targets = spawn_units(self.data, &setup.targets, hit_player, &mut next_id)?;
        let firing = spawn_units(self.data, &setup.firing, firing_player, &mut next_id)?;

        let combat_value =
            MainCombatValue::new(self.data, modifiers(setup)).with_enemy_units(&firing);
        let costs = self.data.costs_for(hit_player);
        let params = OolParameters::new(
            &targets,
            hit_player,
            TerritoryId(setup.battlesite),
            &costs,
            &combat_value,
            self.data,
        );
        let order = CasualtyOrderOfLosses::default().sort_units_for_casualties_with_support(&params)?;

        order
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                Ok(RankedUnit {
                    position: index + 1,
                    id: unit.id.0,
                    unit_type: self.data.unit_type(unit.unit_type)?.name.clone(),
                    hits: unit.hits,
                })
            })
            .collect()
    }

    fn firing_player(&self, setup: &BattleSetup, hit_player: PlayerId) -> Result<PlayerId, ScenarioError> {
        match &setup.firing_player {
            Some(name) => player_id(self.data, name),
            None => Ok(self
                .data
                .players
                .iter()
                .map(|player| player.id)
                .find(|&id| id != hit_player)
                .unwrap_or(hit_player)),
        }
    }

    fn resolve_main(
        &self,
        setup: &BattleSetup,
        hit_player: PlayerId,
        round: u32,
        targets: &[Unit],
        firing: &[Unit],
        dice: &DiceRoll,
        decider: &mut dyn CasualtyDecider,
    ) -> Result<CasualtyDetails, ScenarioError> {
        let combat_value = MainCombatValue::new(self.data, modifiers(setup)).with_enemy_units(firing);
        let hits = match setup.extra_hits {
            Some(extra) => HitsInfo::new(dice).with_extra_hits(extra),
            None => HitsInfo::new(dice),
        };
        let request = CasualtyRequest::new(
            hit_player,
            targets,
            &combat_value,
            TerritoryId(setup.battlesite),
            hits,
        )
        .headless()
        .with_battle_id(BattleId(u64::from(round)));
        Ok(self.selector.select_casualties(&request, decider)?)
    }

    fn resolve_anti_air(
        &self,
        setup: &BattleSetup,
        hit_player: PlayerId,
        round: u32,
        targets: &[Unit],
        firing: &[Unit],
        dice: &DiceRoll,
        random: &mut dyn RandomSource,
        decider: &mut dyn CasualtyDecider,
    ) -> Result<CasualtyDetails, ScenarioError> {
        let planes_combat_value = MainCombatValue::new(self.data, modifiers(setup));
        let aa_combat_value = AaCombatValue::new(
            self.data,
            CombatModifiers::new(opposite(setup.side)),
            targets.len(),
        );
        let request = AaCasualtyRequest {
            planes: targets,
            defending_aa: firing,
            planes_combat_value: &planes_combat_value,
            aa_combat_value: &aa_combat_value,
            dice,
            hit_player,
            battle_id: Some(BattleId(u64::from(round))),
            battlesite: TerritoryId(setup.battlesite),
        };
        Ok(self.aa.get_aa_casualties(&request, random, decider)?)
    }

    /// Fixed hits, or one die per roll of every firing unit.
    fn roll(
        &self,
        setup: &BattleSetup,
        targets: &[Unit],
        firing: &[Unit],
        random: &mut dyn RandomSource,
    ) -> Result<DiceRoll, ScenarioError> {
        if let Some(hits) = setup.hits {
            return Ok(DiceRoll::with_hits(hits));
        }

        let shooters: Vec<&Unit> = firing.iter().collect();
        let firing_side = CombatModifiers::new(opposite(setup.side));
        let evaluation: CombatEvaluation = match setup.kind {
            BattleKind::Main => MainCombatValue::new(self.data, firing_side)
                .with_enemy_units(targets)
                .evaluate(&shooters)?,
            BattleKind::AntiAir => {
                AaCombatValue::new(self.data, firing_side, targets.len()).evaluate(&shooters)?
            }
        };

        let mut dice = Vec::new();
        for unit in firing {
            let value = evaluation.strength_and_rolls(unit.id);
            if value.rolls <= 0 {
                continue;
            }
            let label = format!("Rolling dice for unit {}", unit.id.0);
            for face in random.random_indices(self.data.dice_sides, value.rolls.unsigned_abs(), &label)? {
                let kind = if i64::from(face) < i64::from(value.strength) {
                    DieType::Hit
                } else {
                    DieType::Miss
                };
                dice.push(Die::new(face, kind));
            }
        }
        Ok(DiceRoll::from_dice(dice))
    }
}

/// Resolve every battle of `scenario` in order.
pub fn run_scenario(
    scenario: &Scenario,
    data: &GameData,
    random: &mut dyn RandomSource,
    decider: &mut dyn CasualtyDecider,
    seed: Option<u64>,
) -> Result<ScenarioReport, ScenarioError> {
    let runner = BattleRunner::new(data);
    let battles = scenario
        .battles
        .iter()
        .map(|battle| runner.run_battle(battle, random, decider))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ScenarioReport {
        scenario: scenario.name.clone(),
        seed,
        battles,
    })
}

fn modifiers(setup: &BattleSetup) -> CombatModifiers {
    let modifiers = CombatModifiers::new(setup.side);
    if setup.amphibious {
        modifiers.amphibious()
    } else {
        modifiers
    }
}

const fn opposite(side: CombatSide) -> CombatSide {
    match side {
        CombatSide::Offense => CombatSide::Defense,
        CombatSide::Defense => CombatSide::Offense,
    }
}

/// Create units for `placements`, numbering them from `next_id`.
pub fn spawn_units(
    data: &GameData,
    placements: &[UnitPlacement],
    owner: PlayerId,
    next_id: &mut u64,
) -> Result<Vec<Unit>, ScenarioError> {
    let mut units = Vec::new();
    for placement in placements {
        let unit_type = data
            .unit_types
            .find(&placement.unit_type)
            .ok_or_else(|| CasualtyError::UnknownUnitType(placement.unit_type.clone()))?;
        for _ in 0..placement.count {
            let mut unit = Unit::new(UnitId(*next_id), owner, unit_type)
                .with_hits(placement.hits)
                .with_movement_left(placement.movement_left);
            unit.was_amphibious = placement.amphibious;
            units.push(unit);
            *next_id += 1;
        }
    }
    Ok(units)
}
