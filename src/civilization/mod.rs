//! Civilizations and the actions they choose each tick

pub mod action;
#[allow(clippy::module_inception)]
pub mod civilization;

pub use action::{Action, ActionKind, ActionRecord};
pub use civilization::{Civilization, NeedWeights, Propensities, HOUSING_NORMALIZATION};
