//! Property tests over random seeds and map sizes

use std::collections::BTreeSet;

use civ_engine::civilization::{Civilization, NeedWeights, Propensities};
use civ_engine::core::calendar::Calendar;
use civ_engine::core::config::SimulatorConfig;
use civ_engine::core::types::{CellId, CivId};
use civ_engine::scenario::{generate_world, ScenarioConfig};
use civ_engine::simulation::{run_tick, World};
use civ_engine::territory::{CellProfile, TerritoryGraph};
use proptest::prelude::*;

fn seeded_world(seed: u64, radius: u32, civilizations: u32) -> World {
    let scenario = ScenarioConfig {
        radius,
        civilization_count: civilizations,
        seed,
        sea_level: 0.3,
    };
    let (graph, civs) = generate_world(&scenario).unwrap();
    World::new(graph, civs, Calendar::from_epoch(1000, 1).unwrap(), seed).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_invariants_hold_across_ticks(seed in any::<u64>(), radius in 4u32..9, civs in 2u32..6) {
        let mut world = seeded_world(seed, radius, civs);
        let config = SimulatorConfig::default();

        for tick in 1..=40u64 {
            let changes = run_tick(&mut world, &config).unwrap();
            prop_assert_eq!(changes.tick, tick);
            prop_assert!(world.verify_ownership().is_ok(), "{:?}", world.verify_ownership());

            let mut pairs = BTreeSet::new();
            for war in &world.wars {
                let pair = (war.attacker().min(war.defender()), war.attacker().max(war.defender()));
                prop_assert!(pairs.insert(pair));
            }

            for civ in &world.civilizations {
                let sum: u64 = civ.territory().iter().map(|&id| world.graph.cell(id).population as u64).sum();
                prop_assert_eq!(civ.population, sum);
                prop_assert_eq!(civ.alive, civ.has_territory());
            }
        }
    }

    #[test]
    fn test_claim_is_idempotent(q in -3i32..=3, r in -3i32..=3) {
        let mut graph = TerritoryGraph::uniform(3, CellProfile::default());
        prop_assume!(graph.is_valid(q, r));
        let id = graph.id_at(q, r).unwrap();
        let mut civ = Civilization::new(CivId(0), "Prop", NeedWeights::default(), Propensities::default());

        prop_assert!(civ.claim_cell(&mut graph, id));
        let territory = civ.territory().clone();
        let frontier = civ.frontier().clone();
        prop_assert!(!civ.claim_cell(&mut graph, id));
        prop_assert_eq!(civ.territory(), &territory);
        prop_assert_eq!(civ.frontier(), &frontier);

        let expected: BTreeSet<CellId> = graph.neighbour_ids(id).iter().copied().collect();
        prop_assert_eq!(civ.frontier(), &expected);
    }
}
