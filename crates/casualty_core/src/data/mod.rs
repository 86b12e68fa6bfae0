//! Data structures for game data documents.
//!
//! Pure data types deserialized from RON. Names are resolved to numeric
//! ids by [`GameDataDef::build`]; reading files is left to callers.

mod game_data_def;
mod support_data;
mod unit_type_data;

pub use game_data_def::{GameDataDef, PlayerDef};
pub use support_data::SupportRuleDef;
pub use unit_type_data::UnitTypeDef;
