//! Deterministic unit ordering applied before a battle round.

use std::cmp::Ordering;

use crate::game_data::GameData;
use crate::unit::Unit;

/// Compare by type name, then non-amphibious first, then movement left.
#[must_use]
pub fn compare_pre_battle(data: &GameData, a: &Unit, b: &Unit) -> Ordering {
    let name = |unit: &Unit| data.unit_types.get(unit.unit_type).map(|t| t.name.as_str());
    name(a)
        .cmp(&name(b))
        .then(a.was_amphibious.cmp(&b.was_amphibious))
        .then(a.movement_left.cmp(&b.movement_left))
}

/// Sort a unit group for display and interleaving before a round.
pub fn sort_pre_battle(data: &GameData, units: &mut [Unit]) {
    units.sort_by(|a, b| compare_pre_battle(data, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{PlayerId, UnitId, UnitType};

    #[test]
    fn test_sort_pre_battle() {
        let mut data = GameData::new(6);
        let tank = data.register_unit_type(UnitType::new("tank"));
        let infantry = data.register_unit_type(UnitType::new("infantry"));
        let mut units = vec![
            Unit::new(UnitId(1), PlayerId(0), tank),
            Unit::new(UnitId(2), PlayerId(0), infantry).amphibious(),
            Unit::new(UnitId(3), PlayerId(0), infantry).with_movement_left(1),
            Unit::new(UnitId(4), PlayerId(0), infantry),
        ];
        sort_pre_battle(&data, &mut units);

        let ids: Vec<u64> = units.iter().map(|u| u.id.0).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }
}
