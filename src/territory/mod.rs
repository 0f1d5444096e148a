//! Territory graph: the shared hex map civilizations expand across

pub mod cell;
pub mod graph;
pub mod hex;

pub use cell::{Cell, CellProfile, CellYield, SettlementTier};
pub use graph::TerritoryGraph;
pub use hex::HexCoord;
