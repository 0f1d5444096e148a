//! Simulator - the public surface a driver or renderer talks to
//!
//! Owns the world between ticks. `update` hands the world to a task on the
//! rayon pool for one tick and takes it back when the tick lands; while a
//! tick is in flight the read accessors report the last completed tick.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::civilization::Civilization;
use crate::core::calendar::Calendar;
use crate::core::config::SimulatorConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Tick;
use crate::simulation::output::{ChangeSet, SimulationOutput};
use crate::simulation::tick::run_tick;
use crate::simulation::world::World;
use crate::territory::graph::TerritoryGraph;

type TickResult = (World, Result<ChangeSet>);

pub struct Simulator {
    config: SimulatorConfig,
    /// `None` while a tick is in flight
    world: Option<World>,
    in_flight: Option<mpsc::Receiver<TickResult>>,
    published: VecDeque<ChangeSet>,
    paused: bool,
    since_last_tick: Duration,
    last_tick: Tick,
    last_date: NaiveDate,
}

impl Simulator {
    /// Bind to a seeded graph and civilization list.
    ///
    /// Each civilization must own exactly one seed cell.
    pub fn new(
        graph: TerritoryGraph,
        civilizations: Vec<Civilization>,
        config: SimulatorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let calendar = Calendar::from_epoch(config.epoch_year, config.epoch_month)?;
        let world = World::new(graph, civilizations, calendar, config.seed)?;

        tracing::info!(
            cells = world.graph.len(),
            civilizations = world.civilizations.len(),
            max_ticks = config.max_ticks,
            epoch = %world.calendar.current_date(),
            "simulator ready"
        );

        Ok(Self {
            last_tick: world.calendar.current_tick(),
            last_date: world.calendar.current_date(),
            config,
            world: Some(world),
            in_flight: None,
            published: VecDeque::new(),
            paused: false,
            since_last_tick: Duration::ZERO,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Advance the external clock by `elapsed`.
    ///
    /// Collects a finished tick if there is one, then starts the next tick
    /// in the background once the minimum interval has passed. Does nothing
    /// while paused, at max ticks, or while a tick is still running.
    ///
    /// A failed tick pauses the simulator and is returned here; the world
    /// stays at the last completed tick.
    pub fn update(&mut self, elapsed: Duration) -> Result<()> {
        self.poll()?;
        if self.paused || self.is_finished() || self.in_flight.is_some() {
            return Ok(());
        }

        self.since_last_tick += elapsed;
        if self.since_last_tick < self.config.min_tick_interval() {
            return Ok(());
        }
        self.since_last_tick = Duration::ZERO;
        self.spawn_tick()
    }

    /// Collect the in-flight tick without blocking
    pub fn poll(&mut self) -> Result<()> {
        let Some(rx) = &self.in_flight else {
            return Ok(());
        };
        match rx.try_recv() {
            Ok(landed) => self.land(landed),
            Err(mpsc::TryRecvError::Empty) => Ok(()),
            Err(mpsc::TryRecvError::Disconnected) => {
                self.in_flight = None;
                Err(SimError::WorkerDisconnected)
            }
        }
    }

    /// Block until the in-flight tick lands. Returns immediately if none is running.
    pub fn wait_for_tick(&mut self) -> Result<()> {
        let Some(rx) = self.in_flight.take() else {
            return Ok(());
        };
        match rx.recv() {
            Ok(landed) => self.land(landed),
            Err(mpsc::RecvError) => Err(SimError::WorkerDisconnected),
        }
    }

    /// Run one tick on the calling thread.
    ///
    /// Only effective while paused and below max ticks; returns whether a
    /// tick ran. A tick still in flight from before the pause is collected
    /// first.
    pub fn simulate_one_tick(&mut self) -> Result<bool> {
        self.wait_for_tick()?;
        if !self.paused || self.is_finished() {
            return Ok(false);
        }

        let config = &self.config;
        let world = self.world.as_mut().ok_or(SimError::WorkerDisconnected)?;
        let changes = run_tick(world, config)?;
        self.publish(changes);
        Ok(true)
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        tracing::debug!(paused = self.paused, tick = self.last_tick, "pause toggled");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running_tick(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.last_tick >= self.config.max_ticks
    }

    /// Next published change-set, oldest first. Never blocks.
    pub fn get_changed_cells(&mut self) -> Option<ChangeSet> {
        self.published.pop_front()
    }

    pub fn current_tick(&self) -> Tick {
        self.last_tick
    }

    pub fn current_date(&self) -> NaiveDate {
        self.last_date
    }

    /// The world as of the last completed tick, unless a tick is in flight
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn output(&self, elapsed: Duration) -> Option<SimulationOutput> {
        self.world.as_ref().map(|w| SimulationOutput::new(w, elapsed))
    }

    fn spawn_tick(&mut self) -> Result<()> {
        let Some(mut world) = self.world.take() else {
            return Err(SimError::WorkerDisconnected);
        };
        let config = self.config.clone();
        let (tx, rx) = mpsc::channel();

        // Spawning cannot fail, so the world is never dropped before it runs
        rayon::spawn(move || {
            let ran = panic::catch_unwind(AssertUnwindSafe(|| run_tick(&mut world, &config)));
            match ran {
                // Receiver gone means the simulator was dropped mid-tick
                Ok(result) => {
                    let _ = tx.send((world, result));
                }
                // A serial-phase invariant broke; the half-mutated world is
                // discarded and the closed channel reports the loss
                Err(_) => drop(tx),
            }
        });

        self.in_flight = Some(rx);
        Ok(())
    }

    fn land(&mut self, (world, result): TickResult) -> Result<()> {
        self.in_flight = None;
        self.world = Some(world);
        match result {
            Ok(changes) => {
                self.publish(changes);
                Ok(())
            }
            Err(err) => {
                self.paused = true;
                tracing::warn!(error = %err, tick = self.last_tick, "tick aborted, simulator paused");
                Err(err)
            }
        }
    }

    fn publish(&mut self, changes: ChangeSet) {
        if let Some(world) = &self.world {
            self.last_tick = world.calendar.current_tick();
            self.last_date = world.calendar.current_date();
        }
        if self.is_finished() {
            tracing::info!(tick = self.last_tick, "max ticks reached");
        }
        self.published.push_back(changes);
    }
}
