use thiserror::Error;

use crate::core::types::{CivId, Tick};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Civilization task failed for {civ:?}: {message}")]
    CivilizationTask { civ: CivId, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid world: {0}")]
    InvalidWorld(String),

    #[error("Calendar overflow at tick {0}")]
    CalendarOverflow(Tick),

    #[error("Tick worker disconnected before returning the world")]
    WorkerDisconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
