//! Casualty selection.
//!
//! - [`selector`] - main entry point for ground, naval and air hits
//! - [`aa_selector`] - anti-air hits on aircraft
//! - [`order_of_losses`] - cached weakest-first ranking
//! - [`by_unit_group`] - the ranking engine
//! - [`ool_cache`] - ranking memoisation
//! - [`category`] - interchangeable-unit grouping
//! - [`low_luck`] - guaranteed-hit groups for low-luck AA

pub mod aa_selector;
pub mod by_unit_group;
pub mod category;
pub mod details;
pub mod low_luck;
pub mod ool_cache;
pub mod order_of_losses;
pub mod parameters;
pub mod selector;
pub mod sorting;
pub mod tie_breaker;

pub use aa_selector::{AaCasualtyRequest, AaCasualtySelector};
pub use by_unit_group::OrderOfLossesCalculatorByUnitGroup;
pub use category::{categorize, CategoryGroup, UnitCategory};
pub use details::CasualtyDetails;
pub use low_luck::LowLuckTargetGroups;
pub use ool_cache::{clear_ool_cache, OolCache, OolCacheKey, TypeMultiset};
pub use order_of_losses::CasualtyOrderOfLosses;
pub use parameters::OolParameters;
pub use selector::{dependents_of, total_hit_points_left, CasualtyRequest, CasualtySelector};
pub use sorting::{compare_pre_battle, sort_pre_battle};
pub use tie_breaker::{OolTieBreaker, UnitTypeByPlayer};
