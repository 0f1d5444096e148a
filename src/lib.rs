//! Civ Engine - civilization expansion and conflict on a hex territory graph
//!
//! Civilizations decide and observe in parallel each tick, then the
//! territory graph is mutated serially: ownership cleanup, expansion and
//! war declarations, battles.

pub mod civilization;
pub mod core;
pub mod scenario;
pub mod simulation;
pub mod territory;
pub mod war;
