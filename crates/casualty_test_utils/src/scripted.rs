//! Scripted collaborators for casualty selection tests.
//!
//! [`ScriptedRandomSource`] replays fixed values and records every draw.
//! [`ScriptedDecider`] answers from a queue, falls back to the suggested
//! casualties, and keeps every request and error it saw.

use std::collections::VecDeque;

use casualty_core::casualty::CasualtyDetails;
use casualty_core::decision::{CasualtyDecider, SelectionRequest};
use casualty_core::error::{CasualtyError, Result};
use casualty_core::random::RandomSource;
use casualty_core::unit::UnitId;

/// One draw made against a [`ScriptedRandomSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDraw {
    /// Exclusive upper bound.
    pub bound: u32,
    /// Values requested.
    pub count: u32,
    /// Purpose of the draw.
    pub label: String,
}

/// Random source returning pre-scripted values in order.
#[derive(Debug, Default)]
pub struct ScriptedRandomSource {
    values: VecDeque<u32>,
    draws: Vec<RecordedDraw>,
}

impl ScriptedRandomSource {
    /// Source that will return `values` in order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            draws: Vec::new(),
        }
    }

    /// Draws requested so far.
    #[must_use]
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Values not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandomSource {
    fn random_indices(&mut self, bound: u32, count: u32, label: &str) -> Result<Vec<u32>> {
        self.draws.push(RecordedDraw {
            bound,
            count,
            label: label.to_string(),
        });
        if self.values.len() < count as usize {
            return Err(CasualtyError::RandomSource(format!(
                "script exhausted: wanted {count}, have {}",
                self.values.len()
            )));
        }
        Ok(self.values.drain(..count as usize).collect())
    }
}

/// What a [`ScriptedDecider`] was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Hits to allocate.
    pub hits: u32,
    /// Pool in the order it was offered.
    pub targets: Vec<UnitId>,
    /// Suggested selection.
    pub default_casualties: CasualtyDetails,
}

/// Decider answering from a queue of scripted selections.
#[derive(Debug, Default)]
pub struct ScriptedDecider {
    responses: VecDeque<CasualtyDetails>,
    requests: Vec<RecordedRequest>,
    errors: Vec<String>,
}

impl ScriptedDecider {
    /// Decider that always accepts the suggestion.
    #[must_use]
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Decider returning `responses` in order, then accepting suggestions.
    #[must_use]
    pub fn with_responses(responses: impl IntoIterator<Item = CasualtyDetails>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    /// Errors reported so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl CasualtyDecider for ScriptedDecider {
    fn select_casualties(&mut self, request: &SelectionRequest<'_>) -> CasualtyDetails {
        self.requests.push(RecordedRequest {
            hits: request.hits,
            targets: request.targets.iter().map(|unit| unit.id).collect(),
            default_casualties: request.default_casualties.clone(),
        });
        self.responses.pop_front().unwrap_or_else(|| {
            let mut details = request.default_casualties.clone();
            details.forced = false;
            details
        })
    }

    fn report_error(&mut self, message: &str) {
        tracing::debug!(message, "Scripted decider received error");
        self.errors.push(message.to_string());
    }
}
