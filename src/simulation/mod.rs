pub mod events;
pub mod output;
pub mod simulator;
pub mod territory_step;
pub mod tick;
pub mod world;

pub use events::{Event, EventType, HistoryLog};
pub use output::{ChangeSet, SimulationOutput};
pub use simulator::Simulator;
pub use tick::run_tick;
pub use world::World;
