//! World - the state a tick operates on

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::civilization::Civilization;
use crate::core::calendar::Calendar;
use crate::core::error::{Result, SimError};
use crate::core::types::CivId;
use crate::simulation::events::HistoryLog;
use crate::territory::graph::TerritoryGraph;
use crate::war::War;

/// Everything the tick pipeline reads and writes
#[derive(Debug, Clone)]
pub struct World {
    pub graph: TerritoryGraph,
    /// Indexed by `CivId`
    pub civilizations: Vec<Civilization>,
    /// Active wars in declaration order
    pub wars: Vec<War>,
    pub calendar: Calendar,
    /// Single random stream for every roll in the pipeline
    pub rng: ChaCha8Rng,
    pub history: HistoryLog,
}

impl World {
    /// Wrap a freshly seeded world.
    ///
    /// Every civilization must hold exactly one seed cell, be stored at the
    /// index its id names, and agree with the graph about ownership.
    pub fn new(
        graph: TerritoryGraph,
        civilizations: Vec<Civilization>,
        calendar: Calendar,
        seed: u64,
    ) -> Result<Self> {
        let world = Self {
            graph,
            civilizations,
            wars: Vec::new(),
            calendar,
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: HistoryLog::new(),
        };

        for (i, civ) in world.civilizations.iter().enumerate() {
            if civ.id.index() != i {
                return Err(SimError::InvalidWorld(format!(
                    "{:?} stored at position {}",
                    civ.id, i
                )));
            }
            if civ.territory().len() != 1 {
                return Err(SimError::InvalidWorld(format!(
                    "{:?} ({}) starts with {} cells, expected exactly one seed cell",
                    civ.id,
                    civ.name,
                    civ.territory().len()
                )));
            }
        }
        world.verify_ownership().map_err(SimError::InvalidWorld)?;

        Ok(world)
    }

    pub fn civ(&self, id: CivId) -> &Civilization {
        &self.civilizations[id.index()]
    }

    pub fn civ_mut(&mut self, id: CivId) -> &mut Civilization {
        &mut self.civilizations[id.index()]
    }

    pub fn war_between(&self, a: CivId, b: CivId) -> Option<&War> {
        self.wars.iter().find(|w| w.involves(a, b))
    }

    pub fn alive_count(&self) -> usize {
        self.civilizations.iter().filter(|c| c.alive).count()
    }

    /// Check that cell owners and civilization territories agree, and that
    /// no frontier overlaps its own territory
    pub fn verify_ownership(&self) -> std::result::Result<(), String> {
        for civ in &self.civilizations {
            for &id in civ.territory() {
                if !self.graph.contains(id) {
                    return Err(format!("{:?} owns {:?} which is not on the map", civ.id, id));
                }
                if self.graph.owner_of(id) != Some(civ.id) {
                    return Err(format!(
                        "{:?} lists {:?} but the cell's owner is {:?}",
                        civ.id,
                        id,
                        self.graph.owner_of(id)
                    ));
                }
            }
            if let Some(id) = civ.frontier().intersection(civ.territory()).next() {
                return Err(format!("{:?} has {:?} in both frontier and territory", civ.id, id));
            }
        }

        for cell in self.graph.cells() {
            if let Some(owner) = cell.owner {
                let listed = self
                    .civilizations
                    .get(owner.index())
                    .is_some_and(|civ| civ.owns(cell.id));
                if !listed {
                    return Err(format!(
                        "{:?} is owned by {:?} but missing from its territory",
                        cell.id, owner
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Two distinct civilizations borrowed mutably at once
pub(crate) fn pair_mut(
    civilizations: &mut [Civilization],
    a: CivId,
    b: CivId,
) -> (&mut Civilization, &mut Civilization) {
    assert_ne!(a, b, "a civilization cannot be paired with itself");
    if a.index() < b.index() {
        let (left, right) = civilizations.split_at_mut(b.index());
        (&mut left[a.index()], &mut right[0])
    } else {
        let (left, right) = civilizations.split_at_mut(a.index());
        (&mut right[0], &mut left[b.index()])
    }
}
