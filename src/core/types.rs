//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (one simulated month per tick)
pub type Tick = u64;

/// Index of a cell inside its territory graph
///
/// Ids are assigned once at graph construction and are dense, so they double
/// as indices into the graph's cell storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl CellId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable handle for a civilization
///
/// Civilizations are never removed, so the handle is also the position of the
/// civilization in the world's civilization list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CivId(pub u32);

impl CivId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}
