use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use civ_engine::core::calendar::Calendar;
use civ_engine::core::config::SimulatorConfig;
use civ_engine::scenario::{generate_world, ScenarioConfig};
use civ_engine::simulation::{run_tick, World};

fn warmed_world(radius: u32, civilizations: u32, ticks: u64) -> World {
    let scenario = ScenarioConfig {
        radius,
        civilization_count: civilizations,
        seed: 2024,
        sea_level: 0.3,
    };
    let (graph, civs) = generate_world(&scenario).unwrap();
    let mut world = World::new(graph, civs, Calendar::from_epoch(1000, 1).unwrap(), 2024).unwrap();

    let config = SimulatorConfig::default();
    for _ in 0..ticks {
        run_tick(&mut world, &config).unwrap();
    }
    world
}

fn bench_tick(c: &mut Criterion) {
    let config = SimulatorConfig::default();

    for (name, radius, civilizations) in [("tick_small", 12, 8), ("tick_large", 40, 32)] {
        let world = warmed_world(radius, civilizations, 60);
        c.bench_function(name, |b| {
            b.iter_batched(
                || world.clone(),
                |mut world| black_box(run_tick(&mut world, &config).unwrap()),
                BatchSize::LargeInput,
            )
        });
    }
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
