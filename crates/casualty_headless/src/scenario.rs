//! Scenario loading and configuration.
//!
//! Scenarios bundle the game data with a list of battles for headless
//! resolution: who takes the hits, which units are in the pool, who fires,
//! and how many rounds to fight.

use std::path::Path;

use casualty_core::combat_value::CombatSide;
use casualty_core::data::GameDataDef;
use casualty_core::error::CasualtyError;
use casualty_core::game_data::GameData;
use casualty_core::unit::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Failed to read or write JSON results.
    #[error("Failed to encode results: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Casualty resolution failed.
    #[error("Casualty resolution failed: {0}")]
    Casualty(#[from] CasualtyError),
    /// A battle names a player the game data does not define.
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),
    /// No battle with the requested name.
    #[error("Unknown battle: {0}")]
    UnknownBattle(String),
}

/// Which selector resolves a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BattleKind {
    /// Regular fire against any units.
    #[default]
    Main,
    /// Anti-air fire against aircraft.
    AntiAir,
}

/// A stack of identical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit type name.
    pub unit_type: String,
    /// Number of units.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Damage already taken by each.
    #[serde(default)]
    pub hits: u32,
    /// Movement remaining.
    #[serde(default)]
    pub movement_left: u32,
    /// Landed from the sea this turn.
    #[serde(default)]
    pub amphibious: bool,
}

const fn default_count() -> u32 {
    1
}

impl UnitPlacement {
    /// `count` fresh units of `unit_type`.
    #[must_use]
    pub fn new(unit_type: &str, count: u32) -> Self {
        Self {
            unit_type: unit_type.to_string(),
            count,
            hits: 0,
            movement_left: 0,
            amphibious: false,
        }
    }
}

/// One battle to resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSetup {
    /// Battle name, used in reports and to select a battle.
    pub name: String,
    /// Selector to use.
    #[serde(default)]
    pub kind: BattleKind,
    /// Territory id of the battle site.
    #[serde(default)]
    pub battlesite: u32,
    /// Player whose units take the hits.
    pub hit_player: String,
    /// Player firing; defaults to the first other player.
    #[serde(default)]
    pub firing_player: Option<String>,
    /// Side of the units taking hits.
    #[serde(default = "default_side")]
    pub side: CombatSide,
    /// The hit side landed from the sea.
    #[serde(default)]
    pub amphibious: bool,
    /// Units that may become casualties.
    pub targets: Vec<UnitPlacement>,
    /// Units firing at them.
    #[serde(default)]
    pub firing: Vec<UnitPlacement>,
    /// Fixed hits per round; dice are rolled for `firing` when absent.
    #[serde(default)]
    pub hits: Option<u32>,
    /// Hit budget for non-transport units under restricted transport casualties.
    #[serde(default)]
    pub extra_hits: Option<u32>,
    /// Rounds to fight; stops early once no targets are left.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

const fn default_side() -> CombatSide {
    CombatSide::Defense
}

const fn default_rounds() -> u32 {
    1
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Game data used by every battle.
    pub game: GameDataDef,
    /// Battles, resolved in order.
    pub battles: Vec<BattleSetup>,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve names and build the game data.
    pub fn build_game_data(&self) -> Result<GameData, ScenarioError> {
        Ok(self.game.build()?)
    }

    /// Look up a battle by name.
    pub fn battle(&self, name: &str) -> Result<&BattleSetup, ScenarioError> {
        self.battles
            .iter()
            .find(|battle| battle.name == name)
            .ok_or_else(|| ScenarioError::UnknownBattle(name.to_string()))
    }
}

/// Look up a player id by name.
pub fn player_id(data: &GameData, name: &str) -> Result<PlayerId, ScenarioError> {
    data.players
        .iter()
        .find(|player| player.name == name)
        .map(|player| player.id)
        .ok_or_else(|| ScenarioError::UnknownPlayer(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        Scenario(
            name: "Beachhead",
            game: (
                players: [(name: "Allies"), (name: "Axis")],
                unit_types: [
                    (name: "infantry", attack: 1, defense: 2, cost: 3),
                    (name: "armour", attack: 3, defense: 3, cost: 6),
                ],
            ),
            battles: [
                (
                    name: "landing",
                    hit_player: "Allies",
                    side: Offense,
                    targets: [(unit_type: "infantry", count: 3), (unit_type: "armour")],
                    hits: Some(2),
                ),
            ],
        )
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let scenario = Scenario::from_ron_str(SCENARIO).unwrap();
        let battle = scenario.battle("landing").unwrap();
        assert_eq!(battle.kind, BattleKind::Main);
        assert_eq!(battle.rounds, 1);
        assert_eq!(battle.targets[1].count, 1);
        assert!(battle.firing.is_empty());
        assert!(scenario.battle("missing").is_err());
    }

    #[test]
    fn test_player_lookup() {
        let scenario = Scenario::from_ron_str(SCENARIO).unwrap();
        let data = scenario.build_game_data().unwrap();
        assert_eq!(player_id(&data, "Axis").unwrap(), PlayerId(1));
        assert!(matches!(
            player_id(&data, "Neutral"),
            Err(ScenarioError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("/nonexistent/scenario.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }
}
