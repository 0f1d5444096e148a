//! Simulator configuration with documented constants
//!
//! All tuning numbers for the tick engine are collected here. Values can be
//! overridden from a TOML file; missing keys fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the tick engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    // === DETERMINISM ===
    /// World seed for the war random stream
    ///
    /// Two runs with the same seed, world and tick count produce identical
    /// ownership and identical war outcomes.
    pub seed: u64,

    // === PACING ===
    /// Number of ticks after which the simulator stops advancing
    pub max_ticks: u64,

    /// Minimum wall-clock time between two ticks started by `update`
    ///
    /// The external frame clock may call `update` far more often than this;
    /// elapsed time accumulates until the threshold is reached.
    pub min_tick_interval_ms: u64,

    // === CALENDAR ===
    /// Year of the first simulated month
    pub epoch_year: i32,

    /// Month (1-12) of the first simulated month
    pub epoch_month: u32,

    // === TERRITORY STEP ===
    /// Fraction of current population added per tick while below capacity
    ///
    /// At 0.05 a cell roughly doubles in 14 ticks when far from capacity.
    pub growth_rate: f64,

    /// Fraction of the overshoot removed per tick while above capacity
    pub starvation_rate: f64,

    /// Settlers placed on an empty owned cell that can sustain population
    pub founding_population: u32,

    // === PARALLELIZATION ===
    /// Minimum territory size before a civilization's cells are stepped in parallel
    ///
    /// Below this, the per-cell work is smaller than rayon's splitting overhead.
    pub cell_parallel_threshold: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            max_ticks: 1200,
            min_tick_interval_ms: 100,
            epoch_year: 1000,
            epoch_month: 1,
            growth_rate: 0.05,
            starvation_rate: 0.1,
            founding_population: 5,
            cell_parallel_threshold: 256,
        }
    }
}

impl SimulatorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn min_tick_interval(&self) -> Duration {
        Duration::from_millis(self.min_tick_interval_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.epoch_month) {
            return Err(SimError::InvalidConfig(format!(
                "epoch_month ({}) must be within 1..=12",
                self.epoch_month
            )));
        }

        if !(self.growth_rate > 0.0 && self.growth_rate <= 1.0) {
            return Err(SimError::InvalidConfig(format!(
                "growth_rate ({}) must be within (0, 1]",
                self.growth_rate
            )));
        }

        if !(self.starvation_rate > 0.0 && self.starvation_rate <= 1.0) {
            return Err(SimError::InvalidConfig(format!(
                "starvation_rate ({}) must be within (0, 1]",
                self.starvation_rate
            )));
        }

        if self.founding_population == 0 {
            return Err(SimError::InvalidConfig(
                "founding_population must be positive".into(),
            ));
        }

        if self.cell_parallel_threshold == 0 {
            return Err(SimError::InvalidConfig(
                "cell_parallel_threshold must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_epoch_month_rejected() {
        let config = SimulatorConfig {
            epoch_month: 13,
            ..SimulatorConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_growth_rejected() {
        let config = SimulatorConfig {
            growth_rate: 0.0,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_override() {
        let toml_str = r#"
            seed = 7
            max_ticks = 24
        "#;
        let config = SimulatorConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_ticks, 24);
        assert_eq!(config.growth_rate, SimulatorConfig::default().growth_rate);
    }

    #[test]
    fn test_toml_invalid_values_rejected() {
        let result = SimulatorConfig::from_toml_str("epoch_month = 0");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_syntax_error() {
        let result = SimulatorConfig::from_toml_str("seed = ");
        assert!(matches!(result, Err(SimError::TomlError(_))));
    }
}
