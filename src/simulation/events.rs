//! Events and history logging

use serde::{Deserialize, Serialize};

use crate::core::types::{CivId, Tick};
use crate::war::BattleOutcome;

/// A historical event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub tick: Tick,
    pub event_type: EventType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    WarDeclared {
        attacker: CivId,
        defender: CivId,
    },
    BattleFought {
        attacker: CivId,
        defender: CivId,
        duration: u32,
        result: i64,
        casualties: i64,
        outcome: BattleOutcome,
    },
    WarEnded {
        attacker: CivId,
        defender: CivId,
        victor: CivId,
        cells_transferred: usize,
    },
    CivilizationCollapsed {
        civ: CivId,
    },
}

/// The complete history log
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    pub events: Vec<Event>,
    next_event_id: u32,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event_type: EventType, tick: Tick) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;

        self.events.push(Event {
            id,
            tick,
            event_type,
        });

        id
    }

    pub fn events_for_tick(&self, tick: Tick) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    pub fn events_for_civ(&self, civ: CivId) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.event_type.involves(civ))
    }

    pub fn wars_declared(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.event_type, EventType::WarDeclared { .. }))
            .count()
    }
}

impl EventType {
    pub fn involves(&self, civ: CivId) -> bool {
        match *self {
            EventType::WarDeclared { attacker, defender }
            | EventType::BattleFought {
                attacker, defender, ..
            }
            | EventType::WarEnded {
                attacker, defender, ..
            } => attacker == civ || defender == civ,
            EventType::CivilizationCollapsed { civ: fallen } => fallen == civ,
        }
    }
}
