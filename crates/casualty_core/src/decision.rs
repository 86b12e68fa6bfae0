//! Interface to whoever confirms casualties: a human UI, an AI, or a
//! headless default acceptor.
//!
//! The selector always passes a ranked pool and a default suggestion, so a
//! non-interactive decider can return the suggestion unchanged and stay
//! deterministic. Interactive deciders may block indefinitely; no timeout
//! is imposed here.

use std::collections::HashMap;

use crate::casualty::CasualtyDetails;
use crate::dice::DiceRoll;
use crate::unit::{BattleId, PlayerId, TerritoryId, Unit, UnitId};

/// Cargo carried by each transporting unit in the pool.
pub type Dependents = HashMap<UnitId, Vec<UnitId>>;

/// Everything a decider needs to choose casualties.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Player taking the hits.
    pub player: PlayerId,
    /// Pool in order of losses, weakest first.
    pub targets: &'a [&'a Unit],
    /// Cargo of transports in the pool.
    pub dependents: &'a Dependents,
    /// Hits to allocate.
    pub hits: u32,
    /// The dice that scored them.
    pub dice: &'a DiceRoll,
    /// Suggested selection.
    pub default_casualties: &'a CasualtyDetails,
    /// Battle being resolved.
    pub battle_id: Option<BattleId>,
    /// Where the battle takes place.
    pub battlesite: TerritoryId,
    /// Multi-hit-point units may absorb single hits.
    pub allow_multiple_hits_per_unit: bool,
}

/// A party able to choose casualties.
pub trait CasualtyDecider {
    /// Choose casualties for the request.
    fn select_casualties(&mut self, request: &SelectionRequest<'_>) -> CasualtyDetails;

    /// Tell the decider its last selection was rejected.
    fn report_error(&mut self, message: &str);
}

/// Accepts the suggested casualties unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCasualtyDecider;

impl CasualtyDecider for DefaultCasualtyDecider {
    fn select_casualties(&mut self, request: &SelectionRequest<'_>) -> CasualtyDetails {
        let mut details = request.default_casualties.clone();
        details.forced = false;
        details
    }

    fn report_error(&mut self, message: &str) {
        tracing::warn!(message, "Default casualty selection rejected");
    }
}
