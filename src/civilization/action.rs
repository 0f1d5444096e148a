//! Action records - one decision per civilization per tick

use serde::{Deserialize, Serialize};

use crate::core::types::{CellId, CivId, Tick};

/// Discriminant of an action, used for logging and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Expand,
    Exploit,
    Explore,
    Exterminate,
    DoNothing,
}

/// A chosen intent together with its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Expand { target: CellId },
    Exploit,
    Explore,
    Exterminate { target: CivId },
    DoNothing,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Expand { .. } => ActionKind::Expand,
            Action::Exploit => ActionKind::Exploit,
            Action::Explore => ActionKind::Explore,
            Action::Exterminate { .. } => ActionKind::Exterminate,
            Action::DoNothing => ActionKind::DoNothing,
        }
    }
}

/// Immutable decision artifact, produced in the decision phase and consumed
/// in the action phase of the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    civ: CivId,
    tick: Tick,
    action: Action,
}

impl ActionRecord {
    pub fn new(civ: CivId, tick: Tick, action: Action) -> Self {
        Self { civ, tick, action }
    }

    pub fn civ(&self) -> CivId {
        self.civ
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}
