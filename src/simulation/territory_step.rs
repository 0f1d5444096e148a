//! Per-cell population step
//!
//! Pure function of one cell and the config, so cells can be stepped in any
//! order and on any thread. The tick pipeline applies the returned outcomes
//! serially after the fan-out barrier.

use crate::core::config::SimulatorConfig;
use crate::territory::cell::{Cell, SettlementTier};

/// What the territory step wants to happen to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStep {
    Unchanged,
    Changed {
        population: u32,
        settlement: SettlementTier,
    },
    /// The cell cannot sustain anyone; its owner must let it go
    Abandoned,
}

/// Growth rules copied out of the config so workers share a small value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthRules {
    pub growth_rate: f64,
    pub starvation_rate: f64,
    pub founding_population: u32,
}

impl GrowthRules {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            growth_rate: config.growth_rate,
            starvation_rate: config.starvation_rate,
            founding_population: config.founding_population,
        }
    }
}

/// People the cell can feed and house
pub fn carrying_capacity(cell: &Cell) -> u32 {
    if cell.is_water {
        return 0;
    }
    (cell.housing_capacity as f64 * cell.yields.food.max(0.0)).floor() as u32
}

pub fn step_cell(cell: &Cell, rules: &GrowthRules) -> CellStep {
    let capacity = carrying_capacity(cell);
    let population = cell.population;

    if capacity == 0 && population == 0 {
        return CellStep::Abandoned;
    }

    let next = if population == 0 {
        rules.founding_population.min(capacity)
    } else if population < capacity {
        let growth = ((population as f64 * rules.growth_rate).ceil() as u32).max(1);
        population.saturating_add(growth).min(capacity)
    } else if population > capacity {
        let overshoot = population - capacity;
        let loss = ((overshoot as f64 * rules.starvation_rate).ceil() as u32).max(1);
        population - loss.min(overshoot)
    } else {
        population
    };

    let settlement = SettlementTier::from_population(next);
    if next == population && settlement == cell.settlement {
        CellStep::Unchanged
    } else {
        CellStep::Changed {
            population: next,
            settlement,
        }
    }
}
