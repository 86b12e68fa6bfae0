//! Rule-set flags that shape casualty resolution.
//!
//! Resolved once per game load and passed explicitly to the selectors.

use serde::{Deserialize, Serialize};

use crate::error::{CasualtyError, Result};

/// Rule flags read by casualty selection.
///
/// # Example RON
///
/// ```ron
/// CasualtyRules(
///     low_luck: true,
///     partial_amphibious_retreat: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasualtyRules {
    /// Low-luck dice for every battle.
    #[serde(default)]
    pub low_luck: bool,

    /// Low-luck dice for anti-air fire only.
    #[serde(default)]
    pub low_luck_aa_only: bool,

    /// Scenario editing: every selection goes to the decision-maker.
    #[serde(default)]
    pub edit_mode: bool,

    /// Transports are only hit once other units are gone.
    #[serde(default)]
    pub transport_casualties_restricted: bool,

    /// Non-amphibious land units may retreat from amphibious assaults.
    #[serde(default)]
    pub partial_amphibious_retreat: bool,

    /// The hit player picks anti-air casualties.
    #[serde(default)]
    pub choose_aa_casualties: bool,

    /// Attempts before a rejected selection becomes a hard error.
    #[serde(default = "default_max_selection_attempts")]
    pub max_selection_attempts: u32,
}

const fn default_max_selection_attempts() -> u32 {
    5
}

impl Default for CasualtyRules {
    fn default() -> Self {
        Self {
            low_luck: false,
            low_luck_aa_only: false,
            edit_mode: false,
            transport_casualties_restricted: false,
            partial_amphibious_retreat: false,
            choose_aa_casualties: false,
            max_selection_attempts: default_max_selection_attempts(),
        }
    }
}

impl CasualtyRules {
    /// Parse rules from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| CasualtyError::DataParseError {
            source_name: "rules".to_string(),
            message: e.to_string(),
        })
    }

    /// Whether anti-air fire uses low-luck dice.
    #[must_use]
    pub const fn low_luck_for_aa(&self) -> bool {
        self.low_luck || self.low_luck_aa_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_ron() {
        let rules = CasualtyRules::from_ron_str("()").unwrap();
        assert_eq!(rules, CasualtyRules::default());
        assert_eq!(rules.max_selection_attempts, 5);
    }

    #[test]
    fn test_partial_ron() {
        let rules = CasualtyRules::from_ron_str("(low_luck_aa_only: true, max_selection_attempts: 2)")
            .unwrap();
        assert!(rules.low_luck_for_aa());
        assert!(!rules.low_luck);
        assert_eq!(rules.max_selection_attempts, 2);
    }

    #[test]
    fn test_malformed_ron() {
        let err = CasualtyRules::from_ron_str("(low_luck: maybe)").unwrap_err();
        assert!(matches!(err, CasualtyError::DataParseError { .. }));
    }
}
