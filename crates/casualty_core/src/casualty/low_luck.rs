//! Target groups for low-luck anti-air fire.
//!
//! With `dice_sides / strength` targets per group, each full group
//! guarantees one hit. Targets are first split by category so that every
//! group is homogeneous; the leftovers of each category form the remainder,
//! which is resolved by a random draw.

use super::category::categorize;
use crate::unit::Unit;

/// Targets split into guaranteed-hit groups plus a remainder.
#[derive(Debug, Clone)]
pub struct LowLuckTargetGroups<'a> {
    groups: Vec<Vec<&'a Unit>>,
    remainder: Vec<&'a Unit>,
}

impl<'a> LowLuckTargetGroups<'a> {
    /// Partition `targets` into groups of `group_size`.
    ///
    /// A group size of zero puts every target in the remainder.
    #[must_use]
    pub fn new(targets: &[&'a Unit], group_size: usize) -> Self {
        let mut groups = Vec::new();
        let mut remainder = Vec::new();
        for category in categorize(targets.iter().copied(), None, false) {
            if group_size == 0 {
                remainder.extend(category.units);
                continue;
            }
            let mut chunks = category.units.chunks_exact(group_size);
            groups.extend(chunks.by_ref().map(|chunk| chunk.to_vec()));
            remainder.extend_from_slice(chunks.remainder());
        }
        Self { groups, remainder }
    }

    /// Full groups.
    #[must_use]
    pub fn groups(&self) -> &[Vec<&'a Unit>] {
        &self.groups
    }

    /// One unit per full group.
    #[must_use]
    pub fn guaranteed_hits(&self) -> Vec<&'a Unit> {
        self.groups.iter().filter_map(|group| group.first().copied()).collect()
    }

    /// Targets that did not fill a group.
    #[must_use]
    pub fn remainder_units(&self) -> &[&'a Unit] {
        &self.remainder
    }

    /// Whether any targets are left over.
    #[must_use]
    pub fn has_remainder(&self) -> bool {
        !self.remainder.is_empty()
    }
}
