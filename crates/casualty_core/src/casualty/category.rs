//! Grouping of units that are interchangeable as casualties.

use crate::decision::Dependents;
use crate::unit::{PlayerId, Unit, UnitTypeId};

/// Attributes that make two units interchangeable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitCategory {
    /// Owner.
    pub owner: PlayerId,
    /// Unit type.
    pub unit_type: UnitTypeId,
    /// Damage already taken.
    pub damage: u32,
    /// Number of carried units.
    pub dependents: usize,
    /// Movement left, when categorizing by movement.
    pub movement_left: Option<u32>,
}

/// Units sharing one category, in pool order.
#[derive(Clone, Debug)]
pub struct CategoryGroup<'a> {
    /// Shared attributes.
    pub category: UnitCategory,
    /// Members.
    pub units: Vec<&'a Unit>,
}

/// Split units into categories, in order of first appearance.
///
/// Units carrying cargo only match units carrying the same number of
/// units. Duplicate entries are kept.
#[must_use]
pub fn categorize<'a, I>(
    units: I,
    dependents: Option<&Dependents>,
    by_movement: bool,
) -> Vec<CategoryGroup<'a>>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for unit in units {
        let category = UnitCategory {
            owner: unit.owner,
            unit_type: unit.unit_type,
            damage: unit.hits,
            dependents: dependents
                .and_then(|deps| deps.get(&unit.id))
                .map_or(0, Vec::len),
            movement_left: by_movement.then_some(unit.movement_left),
        };
        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.units.push(unit),
            None => groups.push(CategoryGroup {
                category,
                units: vec![unit],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitId;

    #[test]
    fn test_categories_keep_first_appearance_order() {
        let infantry = UnitTypeId::new(0);
        let armour = UnitTypeId::new(1);
        let units = [
            Unit::new(UnitId(1), PlayerId(0), armour),
            Unit::new(UnitId(2), PlayerId(0), infantry),
            Unit::new(UnitId(3), PlayerId(0), armour),
            Unit::new(UnitId(4), PlayerId(0), armour).with_hits(1),
        ];
        let groups = categorize(&units, None, false);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category.unit_type, armour);
        assert_eq!(groups[0].units.len(), 2);
        assert_eq!(groups[1].category.unit_type, infantry);
        assert_eq!(groups[2].category.damage, 1);
    }

    #[test]
    fn test_dependents_and_movement_split_categories() {
        let transport = UnitTypeId::new(0);
        let units = [
            Unit::new(UnitId(1), PlayerId(0), transport).with_movement_left(2),
            Unit::new(UnitId(2), PlayerId(0), transport),
        ];
        let mut dependents = Dependents::new();
        dependents.insert(UnitId(1), vec![UnitId(10)]);

        assert_eq!(categorize(&units, None, false).len(), 1);
        assert_eq!(categorize(&units, Some(&dependents), false).len(), 2);
        assert_eq!(categorize(&units, None, true).len(), 2);
    }
}
