//! Test fixtures and helpers.
//!
//! A classic land/sea/air roster and unit spawning helpers
//! for consistent testing.

use casualty_core::combat_value::{SupportKind, SupportRule, SupportTarget};
use casualty_core::dice::{DiceRoll, Die, DieType};
use casualty_core::game_data::GameData;
use casualty_core::rules::CasualtyRules;
use casualty_core::unit::{
    AaStats, Domain, PlayerId, TerritoryId, Unit, UnitId, UnitTraits, UnitType, UnitTypeId,
};

/// First player registered by [`classic_game_data`].
pub const ATTACKER: PlayerId = PlayerId(0);

/// Second player registered by [`classic_game_data`].
pub const DEFENDER: PlayerId = PlayerId(1);

/// Battle site used throughout the tests.
pub const BATTLESITE: TerritoryId = TerritoryId(7);

/// Ids of the classic roster.
#[derive(Debug, Clone, Copy)]
pub struct ClassicUnits {
    /// 1/2, cost 3.
    pub infantry: UnitTypeId,
    /// 2/2, cost 4, supports infantry and marines on offense.
    pub artillery: UnitTypeId,
    /// 3/3, cost 6.
    pub armour: UnitTypeId,
    /// 1/2, cost 4, +1 when landing amphibiously.
    pub marine: UnitTypeId,
    /// 3/4 air, cost 10.
    pub fighter: UnitTypeId,
    /// 4/1 air, cost 12.
    pub bomber: UnitTypeId,
    /// 4/4 sea, two hit points, cost 20.
    pub battleship: UnitTypeId,
    /// 0/0 sea transport, cost 7.
    pub transport: UnitTypeId,
    /// AA gun firing one shot at strength 1 per aircraft, up to three.
    pub aa_gun: UnitTypeId,
    /// Infrastructure, absorbs no hits.
    pub factory: UnitTypeId,
}

/// Six-sided game data with the classic roster and default rules.
#[must_use]
pub fn classic_game_data() -> (GameData, ClassicUnits) {
    classic_game_data_with_rules(CasualtyRules::default())
}

/// Classic game data with the given rules.
#[must_use]
pub fn classic_game_data_with_rules(rules: CasualtyRules) -> (GameData, ClassicUnits) {
    let mut data = GameData::new(6).with_rules(rules);
    data.add_player("Attacker");
    data.add_player("Defender");

    let infantry = data.register_unit_type(UnitType::new("infantry").with_strength(1, 2).with_cost(3));
    let artillery =
        data.register_unit_type(UnitType::new("artillery").with_strength(2, 2).with_cost(4));
    let armour = data.register_unit_type(UnitType::new("armour").with_strength(3, 3).with_cost(6));
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
    let bomber = data.register_unit_type(
        UnitType::new("bomber")
            .with_strength(4, 1)
            .with_domain(Domain::Air)
            .with_cost(12),
    );
    let battleship = data.register_unit_type(
        UnitType::new("battleship")
            .with_strength(4, 4)
            .with_hit_points(2)
            .with_domain(Domain::Sea)
            .with_cost(20),
    );
    let transport = data.register_unit_type(
        UnitType::new("transport")
            .with_domain(Domain::Sea)
            .with_traits(UnitTraits::TRANSPORT)
            .with_cost(7),
    );
    let aa_gun = data.register_unit_type(
        UnitType::new("aa_gun")
            .with_aa(AaStats {
                strength: 1,
                max_attacks: Some(3),
                damages_targets: false,
            })
            .with_cost(5),
    );
    let factory = data.register_unit_type(
        UnitType::new("factory")
            .with_traits(UnitTraits::INFRASTRUCTURE)
            .with_cost(15),
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
        ClassicUnits {
            infantry,
            artillery,
            armour,
            marine,
            fighter,
            bomber,
            battleship,
            transport,
            aa_gun,
            factory,
        },
    )
}

/// Hands out units with unique, increasing ids.
#[derive(Debug)]
pub struct UnitFactory {
    next_id: u64,
}

impl Default for UnitFactory {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl UnitFactory {
    /// Factory starting at id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory starting at `first_id`.
    #[must_use]
    pub const fn starting_at(first_id: u64) -> Self {
        Self { next_id: first_id }
    }

    /// One fresh unit.
    pub fn spawn(&mut self, owner: PlayerId, unit_type: UnitTypeId) -> Unit {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        Unit::new(id, owner, unit_type)
    }

    /// `count` fresh units of one type.
    pub fn spawn_many(&mut self, owner: PlayerId, unit_type: UnitTypeId, count: usize) -> Vec<Unit> {
        (0..count).map(|_| self.spawn(owner, unit_type)).collect()
    }
}

/// Dice from a pattern of `h` (hit) and `m` (miss). Other characters are skipped.
///
/// ```
/// use casualty_test_utils::fixtures::dice_pattern;
///
/// let dice = dice_pattern("hmh");
/// assert_eq!(dice.hits, 2);
/// assert_eq!(dice.rolls.len(), 3);
/// ```
#[must_use]
pub fn dice_pattern(pattern: &str) -> DiceRoll {
    DiceRoll::from_dice(
        pattern
            .chars()
            .filter_map(|c| match c {
                'h' => Some(Die::new(0, DieType::Hit)),
                'm' => Some(Die::new(5, DieType::Miss)),
                _ => None,
            })
            .collect(),
    )
}
