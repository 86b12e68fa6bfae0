//! Rolled dice as handed over by the battle.

use serde::{Deserialize, Serialize};

/// Outcome class of a single die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    /// Scored a hit.
    Hit,
    /// Missed.
    Miss,
    /// Rolled but not counted.
    Ignored,
}

/// A single rolled die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Die {
    /// Face value.
    pub value: u32,
    /// Hit or miss.
    pub kind: DieType,
}

impl Die {
    /// Create a die.
    #[must_use]
    pub const fn new(value: u32, kind: DieType) -> Self {
        Self { value, kind }
    }

    /// Whether the die scored a hit.
    #[must_use]
    pub fn is_hit(self) -> bool {
        self.kind == DieType::Hit
    }
}

/// All dice rolled for one firing step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Individual dice, possibly empty for low-luck rolls.
    pub rolls: Vec<Die>,
    /// Hits scored.
    pub hits: u32,
}

impl DiceRoll {
    /// Create a roll from individual dice, counting hits.
    #[must_use]
    pub fn from_dice(rolls: Vec<Die>) -> Self {
        let hits = rolls.iter().filter(|die| die.is_hit()).count() as u32;
        Self { rolls, hits }
    }

    /// A roll that only carries a hit count.
    #[must_use]
    pub const fn with_hits(hits: u32) -> Self {
        Self {
            rolls: Vec::new(),
            hits,
        }
    }
}

/// Hits to allocate in one casualty selection.
#[derive(Debug, Clone, Copy)]
pub struct HitsInfo<'a> {
    /// The dice that produced the hits.
    pub dice: &'a DiceRoll,
    /// Hits left for non-transport units when transport casualties are restricted.
    pub extra_hits: u32,
}

impl<'a> HitsInfo<'a> {
    /// Hits taken straight from the dice.
    #[must_use]
    pub const fn new(dice: &'a DiceRoll) -> Self {
        Self {
            dice,
            extra_hits: dice.hits,
        }
    }

    /// Override the hit budget used under restricted transport casualties.
    #[must_use]
    pub const fn with_extra_hits(mut self, extra_hits: u32) -> Self {
        self.extra_hits = extra_hits;
        self
    }
}
