//! Cell - one hex of the territory graph

use serde::{Deserialize, Serialize};

use crate::core::types::{CellId, CivId};
use crate::territory::hex::HexCoord;

/// Settlement size tier, derived from population
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum SettlementTier {
    #[default]
    Tiny,
    Small,
    Medium,
    Large,
}

impl SettlementTier {
    pub fn from_population(population: u32) -> Self {
        match population {
            0..=49 => SettlementTier::Tiny,
            50..=199 => SettlementTier::Small,
            200..=499 => SettlementTier::Medium,
            _ => SettlementTier::Large,
        }
    }
}

/// Per-cell yield modifiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CellYield {
    pub food: f64,
    pub resource: f64,
    pub wealth: f64,
}

/// Static terrain description used to build a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellProfile {
    pub yields: CellYield,
    pub housing_capacity: u32,
    pub elevation: f64,
    pub is_water: bool,
}

impl Default for CellProfile {
    fn default() -> Self {
        Self {
            yields: CellYield {
                food: 1.0,
                resource: 1.0,
                wealth: 1.0,
            },
            housing_capacity: 100,
            elevation: 0.5,
            is_water: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub coord: HexCoord,

    // Precomputed at graph construction
    pub(crate) neighbours: Vec<CellId>,

    // Ownership
    pub owner: Option<CivId>,

    // Terrain
    pub yields: CellYield,
    pub housing_capacity: u32,
    pub elevation: f64,
    pub is_water: bool,

    // Settlement
    pub population: u32,
    pub settlement: SettlementTier,
}

impl Cell {
    pub fn new(id: CellId, coord: HexCoord, profile: CellProfile) -> Self {
        Self {
            id,
            coord,
            neighbours: Vec::new(),
            owner: None,
            yields: profile.yields,
            housing_capacity: profile.housing_capacity,
            elevation: profile.elevation,
            is_water: profile.is_water,
            population: 0,
            settlement: SettlementTier::Tiny,
        }
    }

    /// Neighbor ids in the fixed axial direction order (missing edges skipped)
    pub fn neighbours(&self) -> &[CellId] {
        &self.neighbours
    }

    pub fn is_owned_by(&self, civ: CivId) -> bool {
        self.owner == Some(civ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_tier_thresholds() {
        assert_eq!(SettlementTier::from_population(0), SettlementTier::Tiny);
        assert_eq!(SettlementTier::from_population(49), SettlementTier::Tiny);
        assert_eq!(SettlementTier::from_population(50), SettlementTier::Small);
        assert_eq!(SettlementTier::from_population(200), SettlementTier::Medium);
        assert_eq!(SettlementTier::from_population(500), SettlementTier::Large);
    }

    #[test]
    fn test_new_cell_is_unowned_and_empty() {
        let cell = Cell::new(CellId(0), HexCoord::ORIGIN, CellProfile::default());
        assert!(cell.owner.is_none());
        assert_eq!(cell.population, 0);
        assert!(cell.neighbours().is_empty());
    }
}
