//! War - a two-party conflict resolved by one battle per tick
//!
//! A war exists only while it is active. Each battle rolls a d20, adds the
//! strength difference between the sides, inflicts attrition on both and
//! checks the victory thresholds, which tighten as the war drags on.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::civilization::Civilization;
use crate::core::types::{CellId, CivId};

/// Strength inputs for one side of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Belligerent {
    pub population: u64,
    pub war_count: usize,
}

impl Belligerent {
    pub fn of(civ: &Civilization) -> Self {
        Self {
            population: civ.population,
            war_count: civ.war_count(),
        }
    }

    /// 0.4 x population + 10 x wars, in fifths so the floor stays exact
    fn strength_fifths(&self) -> i64 {
        2 * self.population as i64 + 50 * self.war_count as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Continues,
    AttackerVictory,
    DefenderVictory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub roll: i64,
    pub result: i64,
    /// Applied to both sides; negative values add population
    pub casualties: i64,
    /// Duration the battle was fought at (before the increment)
    pub duration: u32,
    pub outcome: BattleOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct War {
    attacker: CivId,
    defender: CivId,
    duration: u32,
}

impl War {
    pub fn new(attacker: CivId, defender: CivId) -> Self {
        Self {
            attacker,
            defender,
            duration: 1,
        }
    }

    pub fn attacker(&self) -> CivId {
        self.attacker
    }

    pub fn defender(&self) -> CivId {
        self.defender
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// True if this war is between `a` and `b`, in either direction
    pub fn involves(&self, a: CivId, b: CivId) -> bool {
        (self.attacker == a && self.defender == b) || (self.attacker == b && self.defender == a)
    }

    pub fn opponent_of(&self, civ: CivId) -> Option<CivId> {
        if civ == self.attacker {
            Some(self.defender)
        } else if civ == self.defender {
            Some(self.attacker)
        } else {
            None
        }
    }

    /// Fight one battle, drawing the d20 from the shared stream
    pub fn battle<R: Rng>(
        &mut self,
        attacker: Belligerent,
        defender: Belligerent,
        rng: &mut R,
    ) -> BattleReport {
        let roll = rng.gen_range(1..=20);
        self.resolve(roll, attacker, defender)
    }

    /// Fight one battle with a known roll
    pub fn resolve(&mut self, roll: i64, attacker: Belligerent, defender: Belligerent) -> BattleReport {
        let duration = self.duration as i64;
        let result = (5 * roll + attacker.strength_fifths() - defender.strength_fifths()).div_euclid(5);
        let casualties = result * 5 * duration;

        let outcome = if result > 100 - 5 * duration {
            BattleOutcome::AttackerVictory
        } else if result < 5 * duration {
            BattleOutcome::DefenderVictory
        } else {
            BattleOutcome::Continues
        };

        let report = BattleReport {
            roll,
            result,
            casualties,
            duration: self.duration,
            outcome,
        };
        self.duration += 1;
        report
    }

    /// (winner, loser) for a finished battle
    pub fn victor(&self, outcome: BattleOutcome) -> Option<(CivId, CivId)> {
        match outcome {
            BattleOutcome::Continues => None,
            BattleOutcome::AttackerVictory => Some((self.attacker, self.defender)),
            BattleOutcome::DefenderVictory => Some((self.defender, self.attacker)),
        }
    }

    /// Cells that change hands when `loser` loses: all of its territory
    pub fn result_cells(&self, loser: &Civilization) -> Vec<CellId> {
        loser.territory().iter().copied().collect()
    }
}
