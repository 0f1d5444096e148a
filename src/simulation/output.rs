//! Change-sets published per tick, and the end-of-run snapshot

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::civilization::Civilization;
use crate::core::error::Result;
use crate::core::types::{CellId, CivId, Tick};
use crate::simulation::events::HistoryLog;
use crate::simulation::world::World;
use crate::war::War;

/// Cells whose observable state changed during one tick
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub tick: Tick,
    /// Sorted, no duplicates
    pub cells: Vec<CellId>,
}

impl ChangeSet {
    pub fn new(tick: Tick, cells: BTreeSet<CellId>) -> Self {
        Self {
            tick,
            cells: cells.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub final_world: WorldSnapshot,
    pub history: HistoryLog,
    pub statistics: SimulationStats,
}

/// Serializable snapshot of world state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub date: NaiveDate,
    pub civilizations: Vec<Civilization>,
    pub wars: Vec<War>,
    /// Owner of each cell, indexed by `CellId`
    pub ownership: Vec<Option<CivId>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub ticks_simulated: Tick,
    pub simulation_time_ms: u64,
    pub total_events: u32,
    pub wars_fought: u32,
    pub civilizations_at_start: u32,
    pub civilizations_alive: u32,
    pub cells_owned: u32,
}

impl SimulationOutput {
    pub fn new(world: &World, elapsed: Duration) -> Self {
        let ownership: Vec<Option<CivId>> = world.graph.cells().iter().map(|c| c.owner).collect();
        let cells_owned = ownership.iter().filter(|o| o.is_some()).count() as u32;

        Self {
            final_world: WorldSnapshot {
                tick: world.calendar.current_tick(),
                date: world.calendar.current_date(),
                civilizations: world.civilizations.clone(),
                wars: world.wars.clone(),
                ownership,
            },
            history: world.history.clone(),
            statistics: SimulationStats {
                ticks_simulated: world.calendar.current_tick(),
                simulation_time_ms: elapsed.as_millis() as u64,
                total_events: world.history.events.len() as u32,
                wars_fought: world.history.wars_declared() as u32,
                civilizations_at_start: world.civilizations.len() as u32,
                civilizations_alive: world.alive_count() as u32,
                cells_owned,
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "Simulated {} ticks (to {}) in {}ms\n{} events, {} wars, {} of {} civilizations remain, {} cells owned",
            self.statistics.ticks_simulated,
            self.final_world.date,
            self.statistics.simulation_time_ms,
            self.statistics.total_events,
            self.statistics.wars_fought,
            self.statistics.civilizations_alive,
            self.statistics.civilizations_at_start,
            self.statistics.cells_owned,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_set_is_sorted_and_unique() {
        let cells: BTreeSet<CellId> = [CellId(4), CellId(1), CellId(4), CellId(2)].into_iter().collect();
        let set = ChangeSet::new(3, cells);
        assert_eq!(set.cells, vec![CellId(1), CellId(2), CellId(4)]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.tick, 3);
    }
}
