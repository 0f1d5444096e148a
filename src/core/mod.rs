//! Shared ids, errors, configuration and the simulation calendar

pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::Calendar;
pub use config::SimulatorConfig;
pub use error::{Result, SimError};
pub use types::{CellId, CivId, Tick};
