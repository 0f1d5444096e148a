//! Headless civilization simulation
//!
//! Seeds a world, drives the simulator from a frame clock, and writes the
//! final snapshot as JSON.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use civ_engine::core::config::SimulatorConfig;
use civ_engine::scenario::{generate_world, ScenarioConfig};
use civ_engine::simulation::Simulator;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Headless Civilization Simulation
#[derive(Parser, Debug)]
#[command(name = "civ_sim")]
#[command(about = "Run a civilization expansion and war simulation on a hex map")]
struct Args {
    /// Map radius in hex rings
    #[arg(long, default_value_t = 20)]
    radius: u32,

    /// Number of civilizations to seed
    #[arg(long, default_value_t = 8)]
    civilizations: u32,

    /// Random seed for world generation and battles (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks (simulated months) to run (overrides config)
    #[arg(long)]
    ticks: Option<u64>,

    /// Minimum wall time between ticks (overrides config)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Frame clock period
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Simulator config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final snapshot here as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("civ_engine=info,civ_sim=info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.max_ticks = ticks;
    }
    if let Some(interval) = args.interval_ms {
        config.min_tick_interval_ms = interval;
    }

    let scenario = ScenarioConfig {
        radius: args.radius,
        civilization_count: args.civilizations,
        seed: config.seed,
        ..ScenarioConfig::default()
    };
    let (graph, civilizations) = generate_world(&scenario)?;
    let mut sim = Simulator::new(graph, civilizations, config)?;

    tracing::info!(
        radius = args.radius,
        civilizations = args.civilizations,
        seed = sim.config().seed,
        ticks = sim.config().max_ticks,
        "starting simulation"
    );

    let start = Instant::now();
    let mut frames = tokio::time::interval(Duration::from_millis(args.frame_ms.max(1)));
    let mut last_frame = frames.tick().await;
    let mut cells_changed = 0usize;

    loop {
        let now = frames.tick().await;
        sim.update(now - last_frame)?;
        last_frame = now;

        while let Some(changes) = sim.get_changed_cells() {
            cells_changed += changes.len();
            if changes.tick % 12 == 0 {
                if let Some(world) = sim.world() {
                    tracing::info!(
                        tick = changes.tick,
                        date = %sim.current_date(),
                        alive = world.alive_count(),
                        wars = world.wars.len(),
                        "year passed"
                    );
                }
            }
        }

        if sim.is_finished() && !sim.is_running_tick() {
            break;
        }
    }

    let output = sim
        .output(start.elapsed())
        .ok_or("simulation ended without a world")?;
    println!("{}", output.summary());
    println!("{} cell updates published", cells_changed);

    if let Some(path) = &args.output {
        std::fs::write(path, output.to_json()?)?;
        println!("Full output written to {}", path.display());
    }

    Ok(())
}
