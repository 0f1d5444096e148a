//! Scenario seeding - builds a starting map and places civilizations
//!
//! Deterministic for a given `ScenarioConfig`: the same seed always yields
//! the same terrain, seed cells, names and temperaments.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::civilization::{Civilization, NeedWeights, Propensities};
use crate::core::error::{Result, SimError};
use crate::core::types::{CellId, CivId};
use crate::territory::cell::{CellProfile, CellYield};
use crate::territory::graph::TerritoryGraph;
use crate::territory::hex::HexCoord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Rings around the origin cell
    pub radius: u32,
    pub civilization_count: u32,
    pub seed: u64,
    /// Cells with elevation below this are water
    pub sea_level: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            radius: 20,
            civilization_count: 8,
            seed: 12345,
            sea_level: 0.3,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.civilization_count == 0 {
            return Err(SimError::InvalidConfig(
                "civilization_count must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sea_level) {
            return Err(SimError::InvalidConfig(format!(
                "sea_level ({}) must be within [0, 1]",
                self.sea_level
            )));
        }
        Ok(())
    }
}

/// Build the map and one civilization per seed cell
pub fn generate_world(config: &ScenarioConfig) -> Result<(TerritoryGraph, Vec<Civilization>)> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let radius = config.radius.max(1) as f64;
    let mut graph = TerritoryGraph::build(config.radius, |coord| {
        generate_terrain(coord, radius, config, &mut rng)
    });

    let mut land: Vec<CellId> = graph
        .cells()
        .iter()
        .filter(|c| !c.is_water)
        .map(|c| c.id)
        .collect();
    let count = config.civilization_count as usize;
    if land.len() < count {
        return Err(SimError::InvalidWorld(format!(
            "{} civilizations need seed cells but only {} land cells exist",
            count,
            land.len()
        )));
    }

    land.shuffle(&mut rng);
    let mut civilizations = Vec::with_capacity(count);
    for (i, &seed) in land.iter().take(count).enumerate() {
        let mut civ = Civilization::new(
            CivId(i as u32),
            generate_name(&mut rng),
            generate_needs(&mut rng),
            generate_propensities(&mut rng),
        );
        civ.claim_cell(&mut graph, seed);
        civilizations.push(civ);
    }

    tracing::debug!(
        cells = graph.len(),
        land = land.len(),
        civilizations = civilizations.len(),
        seed = config.seed,
        "scenario generated"
    );
    Ok((graph, civilizations))
}

fn generate_terrain(
    coord: HexCoord,
    radius: f64,
    config: &ScenarioConfig,
    rng: &mut ChaCha8Rng,
) -> CellProfile {
    let noise = simple_noise(coord, config.seed);

    // Land rises toward the middle of the map
    let edge = HexCoord::ORIGIN.distance(&coord) as f64 / radius;
    let elevation = (0.6 * noise + 0.4 * (1.0 - edge)).clamp(0.0, 1.0);
    let is_water = elevation < config.sea_level;

    // Lowlands feed more people, highlands carry more resources
    let fertility = 1.0 - (elevation - 0.4).abs();
    let yields = CellYield {
        food: (fertility * rng.gen_range(0.6..1.4)).max(0.0),
        resource: elevation * rng.gen_range(0.5..1.5),
        wealth: rng.gen_range(0.2..1.2),
    };

    CellProfile {
        yields,
        housing_capacity: rng.gen_range(40..160),
        elevation,
        is_water,
    }
}

fn simple_noise(coord: HexCoord, seed: u64) -> f64 {
    let n = (coord.q as i64 as u64)
        .wrapping_mul(374761393)
        .wrapping_add((coord.r as i64 as u64).wrapping_mul(668265263))
        .wrapping_add(seed);
    let n = n.wrapping_mul(n).wrapping_mul(n);
    n as f64 / u64::MAX as f64
}

fn generate_needs(rng: &mut ChaCha8Rng) -> NeedWeights {
    NeedWeights {
        housing: rng.gen_range(0.5..1.5),
        food: rng.gen_range(0.5..1.5),
        resource: rng.gen_range(0.2..1.0),
        wealth: rng.gen_range(0.2..1.0),
        war: rng.gen_range(-3.0..0.5),
    }
}

fn generate_propensities(rng: &mut ChaCha8Rng) -> Propensities {
    Propensities {
        expand: rng.gen_range(0.4..1.0),
        exploit: rng.gen_range(0.1..0.6),
        explore: rng.gen_range(0.0..0.4),
        exterminate: rng.gen_range(0.0..0.8),
    }
}

fn generate_name(rng: &mut ChaCha8Rng) -> String {
    let prefixes = ["Ash", "Bel", "Cor", "Dun", "Esk", "Fal", "Gor", "Hal", "Ist", "Kar"];
    let suffixes = ["ria", "mark", "ton", "heim", "dor", "vale", "gard", "os", "ia", "wick"];

    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    let suffix = suffixes[rng.gen_range(0..suffixes.len())];

    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::Calendar;
    use crate::simulation::world::World;

    fn small_config(seed: u64) -> ScenarioConfig {
        ScenarioConfig {
            radius: 8,
            civilization_count: 4,
            seed,
            sea_level: 0.3,
        }
    }

    #[test]
    fn test_each_civ_owns_one_land_seed() {
        let (graph, civs) = generate_world(&small_config(7)).unwrap();
        assert_eq!(civs.len(), 4);
        for (i, civ) in civs.iter().enumerate() {
            assert_eq!(civ.id, CivId(i as u32));
            assert_eq!(civ.territory().len(), 1);
            let seed = *civ.territory().iter().next().unwrap();
            assert!(!graph.cell(seed).is_water);
            assert_eq!(graph.owner_of(seed), Some(civ.id));
        }
    }

    #[test]
    fn test_generated_world_is_accepted() {
        let (graph, civs) = generate_world(&small_config(7)).unwrap();
        let calendar = Calendar::from_epoch(1000, 1).unwrap();
        assert!(World::new(graph, civs, calendar, 7).is_ok());
    }

    #[test]
    fn test_same_seed_same_world() {
        let (graph_a, civs_a) = generate_world(&small_config(99)).unwrap();
        let (graph_b, civs_b) = generate_world(&small_config(99)).unwrap();

        let owners_a: Vec<_> = graph_a.cells().iter().map(|c| c.owner).collect();
        let owners_b: Vec<_> = graph_b.cells().iter().map(|c| c.owner).collect();
        assert_eq!(owners_a, owners_b);
        let names_a: Vec<_> = civs_a.iter().map(|c| c.name.clone()).collect();
        let names_b: Vec<_> = civs_b.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn test_too_few_land_cells() {
        let config = ScenarioConfig {
            radius: 1,
            civilization_count: 20,
            ..ScenarioConfig::default()
        };
        assert!(matches!(
            generate_world(&config),
            Err(SimError::InvalidWorld(_))
        ));
    }

    #[test]
    fn test_invalid_sea_level() {
        let config = ScenarioConfig {
            sea_level: 1.5,
            ..ScenarioConfig::default()
        };
        assert!(matches!(
            generate_world(&config),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
