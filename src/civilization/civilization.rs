//! Civilization - a territorial actor on the hex map
//!
//! A civilization owns a set of cells, keeps a frontier of adjacent cells it
//! does not own, and decides one action per tick. Decisions read the graph
//! only; every ownership change goes through `claim_cell` / `lose_cell`,
//! which the tick pipeline calls from its serial phases.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::civilization::action::{Action, ActionRecord};
use crate::core::types::{CellId, CivId, Tick};
use crate::territory::cell::SettlementTier;
use crate::territory::graph::TerritoryGraph;

/// Housing capacity is divided by this before weighting
pub const HOUSING_NORMALIZATION: f64 = 100.0;

/// How much a civilization cares about each property of a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedWeights {
    pub housing: f64,
    pub food: f64,
    pub resource: f64,
    pub wealth: f64,
    /// Added once per neighboring cell held by another civilization.
    /// Negative values make contested borders less attractive.
    pub war: f64,
}

impl Default for NeedWeights {
    fn default() -> Self {
        Self {
            housing: 1.0,
            food: 1.0,
            resource: 0.5,
            wealth: 0.5,
            war: -2.0,
        }
    }
}

/// Base weight of each top-level strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Propensities {
    pub expand: f64,
    pub exploit: f64,
    pub explore: f64,
    pub exterminate: f64,
}

impl Default for Propensities {
    fn default() -> Self {
        Self {
            expand: 1.0,
            exploit: 0.3,
            explore: 0.2,
            exterminate: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Civilization {
    pub id: CivId,
    pub name: String,
    pub alive: bool,

    territory: BTreeSet<CellId>,
    /// Approximate: entries may go stale when a neighbor changes hands
    /// through another civilization. Consumers re-check ownership.
    frontier: BTreeSet<CellId>,

    pub population: u64,
    pub needs: NeedWeights,
    pub propensities: Propensities,

    /// Opponents of every war this civilization is part of
    wars: Vec<CivId>,
}

impl Civilization {
    pub fn new(
        id: CivId,
        name: impl Into<String>,
        needs: NeedWeights,
        propensities: Propensities,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            alive: true,
            territory: BTreeSet::new(),
            frontier: BTreeSet::new(),
            population: 0,
            needs,
            propensities,
            wars: Vec::new(),
        }
    }

    pub fn territory(&self) -> &BTreeSet<CellId> {
        &self.territory
    }

    pub fn frontier(&self) -> &BTreeSet<CellId> {
        &self.frontier
    }

    pub fn has_territory(&self) -> bool {
        !self.territory.is_empty()
    }

    pub fn owns(&self, cell: CellId) -> bool {
        self.territory.contains(&cell)
    }

    // === WARS ===

    pub fn wars(&self) -> &[CivId] {
        &self.wars
    }

    pub fn war_count(&self) -> usize {
        self.wars.len()
    }

    pub fn is_at_war_with(&self, other: CivId) -> bool {
        self.wars.contains(&other)
    }

    pub fn add_war(&mut self, opponent: CivId) {
        if !self.wars.contains(&opponent) {
            self.wars.push(opponent);
        }
    }

    pub fn remove_war(&mut self, opponent: CivId) {
        self.wars.retain(|&w| w != opponent);
    }

    // === DECISION ===

    /// Pick this tick's action. Reads the graph, mutates nothing.
    ///
    /// Each propensity is zeroed when its action has no valid target, then
    /// the largest positive weight wins. Ties go to the earlier action in
    /// Expand, Exploit, Explore, Exterminate order. Nothing positive means
    /// DoNothing.
    pub fn determine_action(&self, graph: &TerritoryGraph, tick: Tick) -> ActionRecord {
        let p = &self.propensities;
        let candidates = [
            (self.best_expansion_target(graph).map(|target| Action::Expand { target }), p.expand),
            (Some(Action::Exploit), p.exploit),
            (Some(Action::Explore), p.explore),
            (self.primary_rival(graph).map(|target| Action::Exterminate { target }), p.exterminate),
        ];

        let action = candidates
            .into_iter()
            .filter_map(|(action, weight)| action.map(|a| (a, weight)))
            .filter(|(_, weight)| *weight > 0.0)
            .fold(None, |best: Option<(Action, f64)>, (action, weight)| match best {
                Some((_, best_weight)) if best_weight >= weight => best,
                _ => Some((action, weight)),
            })
            .map_or(Action::DoNothing, |(action, _)| action);

        ActionRecord::new(self.id, tick, action)
    }

    /// Highest-valued unowned land cell on the frontier; the lowest id wins ties
    pub fn best_expansion_target(&self, graph: &TerritoryGraph) -> Option<CellId> {
        self.frontier
            .iter()
            .copied()
            .filter(|&id| {
                let cell = graph.cell(id);
                cell.owner.is_none() && !cell.is_water
            })
            .map(|id| (id, self.calculate_cell_value(graph, id)))
            .fold(None, |best: Option<(CellId, f64)>, (id, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((id, value)),
            })
            .map(|(id, _)| id)
    }

    /// Neighbor holding the most frontier cells, excluding current enemies;
    /// the lowest id wins ties
    pub fn primary_rival(&self, graph: &TerritoryGraph) -> Option<CivId> {
        let mut border: BTreeMap<CivId, usize> = BTreeMap::new();
        for &id in &self.frontier {
            if let Some(owner) = graph.owner_of(id) {
                if owner != self.id && !self.is_at_war_with(owner) {
                    *border.entry(owner).or_insert(0) += 1;
                }
            }
        }

        border
            .into_iter()
            .fold(None, |best: Option<(CivId, usize)>, (civ, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((civ, count)),
            })
            .map(|(civ, _)| civ)
    }

    /// Desirability of a cell for this civilization
    pub fn calculate_cell_value(&self, graph: &TerritoryGraph, id: CellId) -> f64 {
        let cell = graph.cell(id);
        let needs = &self.needs;

        let mut value = cell.housing_capacity as f64 / HOUSING_NORMALIZATION * needs.housing
            + cell.yields.food * needs.food
            + cell.yields.resource * needs.resource
            + cell.yields.wealth * needs.wealth;

        for &n in graph.neighbour_ids(id) {
            match graph.owner_of(n) {
                Some(owner) if owner == self.id => value += 1.0,
                Some(_) => value += needs.war,
                None => {}
            }
        }

        value
    }

    // === TERRITORY MUTATION (serial phases only) ===

    /// Take ownership of an unowned cell. Returns false, touching nothing,
    /// if the cell already has an owner.
    pub fn claim_cell(&mut self, graph: &mut TerritoryGraph, id: CellId) -> bool {
        let cell = graph.cell_mut(id);
        if cell.owner.is_some() {
            return false;
        }
        cell.owner = Some(self.id);

        self.territory.insert(id);
        self.frontier.remove(&id);
        for &n in graph.neighbour_ids(id) {
            if !graph.cell(n).is_owned_by(self.id) {
                self.frontier.insert(n);
            }
        }

        true
    }

    /// Give up a cell this civilization owns.
    ///
    /// Only this civilization's own bookkeeping is updated; other
    /// civilizations' frontiers are left as they are.
    ///
    /// # Panics
    /// If the cell is not owned by this civilization.
    pub fn lose_cell(&mut self, graph: &mut TerritoryGraph, id: CellId) {
        let cell = graph.cell_mut(id);
        if !cell.is_owned_by(self.id) || !self.territory.contains(&id) {
            panic!(
                "{:?} ({}) cannot lose {:?}: owner is {:?}",
                self.id, self.name, id, cell.owner
            );
        }
        cell.owner = None;
        self.territory.remove(&id);

        if graph.neighbour_ids(id).iter().any(|n| self.territory.contains(n)) {
            self.frontier.insert(id);
        }
    }

    // === POPULATION ===

    /// Apply war attrition. Positive casualties drain cells in id order,
    /// negative casualties settle on the first cell. Population never goes
    /// below zero. Returns the cells whose population changed.
    pub fn apply_casualties(&mut self, graph: &mut TerritoryGraph, casualties: i64) -> Vec<CellId> {
        let mut touched = Vec::new();

        if casualties > 0 {
            let mut remaining = casualties as u64;
            for &id in &self.territory {
                if remaining == 0 {
                    break;
                }
                let cell = graph.cell_mut(id);
                let lost = remaining.min(cell.population as u64);
                if lost > 0 {
                    cell.population -= lost as u32;
                    cell.settlement = SettlementTier::from_population(cell.population);
                    remaining -= lost;
                    touched.push(id);
                }
            }
            self.population = self.population.saturating_sub(casualties as u64);
        } else if casualties < 0 {
            let gain = casualties.unsigned_abs();
            if let Some(&first) = self.territory.iter().next() {
                let cell = graph.cell_mut(first);
                let added = u32::try_from(gain).unwrap_or(u32::MAX);
                cell.population = cell.population.saturating_add(added);
                cell.settlement = SettlementTier::from_population(cell.population);
                touched.push(first);
            }
            self.population = self.population.saturating_add(gain);
        }

        touched
    }

    /// Recompute population as the sum over owned cells
    pub fn refresh_population(&mut self, graph: &TerritoryGraph) {
        self.population = self
            .territory
            .iter()
            .map(|&id| graph.cell(id).population as u64)
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civilization::action::ActionKind;
    use crate::territory::cell::{CellProfile, CellYield};

    fn create_test_graph() -> TerritoryGraph {
        TerritoryGraph::uniform(3, CellProfile::default())
    }

    fn create_test_civ(id: u32) -> Civilization {
        Civilization::new(
            CivId(id),
            format!("Civ {id}"),
            NeedWeights::default(),
            Propensities::default(),
        )
    }

    #[test]
    fn test_claim_unowned_cell_updates_frontier() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();

        assert!(civ.claim_cell(&mut graph, origin));
        assert_eq!(graph.owner_of(origin), Some(CivId(0)));
        assert!(civ.owns(origin));

        let expected: BTreeSet<CellId> = graph.neighbour_ids(origin).iter().copied().collect();
        assert_eq!(civ.frontier(), &expected);
        assert!(!civ.frontier().contains(&origin));
    }

    #[test]
    fn test_claim_removes_cell_from_frontier() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();
        let east = graph.id_at(1, 0).unwrap();

        civ.claim_cell(&mut graph, origin);
        assert!(civ.frontier().contains(&east));
        civ.claim_cell(&mut graph, east);
        assert!(!civ.frontier().contains(&east));
        assert!(civ.frontier().is_disjoint(civ.territory()));
    }

    #[test]
    fn test_claim_twice_fails() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();

        assert!(civ.claim_cell(&mut graph, origin));
        let territory_before = civ.territory().clone();
        assert!(!civ.claim_cell(&mut graph, origin));
        assert_eq!(civ.territory(), &territory_before);
    }

    #[test]
    fn test_claim_foreign_cell_fails() {
        let mut graph = create_test_graph();
        let mut a = create_test_civ(0);
        let mut b = create_test_civ(1);
        let origin = graph.id_at(0, 0).unwrap();

        assert!(a.claim_cell(&mut graph, origin));
        assert!(!b.claim_cell(&mut graph, origin));
        assert!(!b.has_territory());
        assert_eq!(graph.owner_of(origin), Some(CivId(0)));
    }

    #[test]
    fn test_lose_cell_clears_owner() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();
        let east = graph.id_at(1, 0).unwrap();
        civ.claim_cell(&mut graph, origin);
        civ.claim_cell(&mut graph, east);

        civ.lose_cell(&mut graph, east);
        assert!(graph.owner_of(east).is_none());
        assert!(!civ.owns(east));
        // Still borders the remaining territory
        assert!(civ.frontier().contains(&east));
    }

    #[test]
    #[should_panic(expected = "cannot lose")]
    fn test_lose_unowned_cell_panics() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();
        civ.lose_cell(&mut graph, origin);
    }

    #[test]
    fn test_cell_value_terms() {
        let profile = CellProfile {
            yields: CellYield {
                food: 2.0,
                resource: 1.0,
                wealth: 4.0,
            },
            housing_capacity: 200,
            elevation: 0.0,
            is_water: false,
        };
        let mut graph = TerritoryGraph::uniform(2, profile);
        let civ = Civilization::new(
            CivId(0),
            "Valued",
            NeedWeights {
                housing: 1.0,
                food: 1.0,
                resource: 1.0,
                wealth: 0.5,
                war: -3.0,
            },
            Propensities::default(),
        );
        let origin = graph.id_at(0, 0).unwrap();

        // 200/100*1 + 2*1 + 1*1 + 4*0.5
        assert_eq!(civ.calculate_cell_value(&graph, origin), 7.0);

        graph.cell_mut(graph.id_at(1, 0).unwrap()).owner = Some(CivId(0));
        graph.cell_mut(graph.id_at(0, 1).unwrap()).owner = Some(CivId(0));
        graph.cell_mut(graph.id_at(-1, 0).unwrap()).owner = Some(CivId(4));
        assert_eq!(civ.calculate_cell_value(&graph, origin), 7.0 + 2.0 - 3.0);
    }

    #[test]
    fn test_empty_frontier_does_not_expand() {
        let graph = create_test_graph();
        let civ = create_test_civ(0);
        let record = civ.determine_action(&graph, 1);
        assert_ne!(record.kind(), ActionKind::Expand);
        // exploit has the next highest default propensity
        assert_eq!(record.kind(), ActionKind::Exploit);
    }

    #[test]
    fn test_all_zero_propensities_do_nothing() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        civ.propensities = Propensities {
            expand: 0.0,
            exploit: 0.0,
            explore: 0.0,
            exterminate: 0.0,
        };
        let cell = graph.id_at(0, 0).unwrap();
        civ.claim_cell(&mut graph, cell);
        assert_eq!(civ.determine_action(&graph, 1).action(), Action::DoNothing);
    }

    #[test]
    fn test_expand_targets_best_cell() {
        let mut graph = TerritoryGraph::build(2, |coord| CellProfile {
            housing_capacity: if coord.q == 0 && coord.r == 1 { 500 } else { 100 },
            ..CellProfile::default()
        });
        let mut civ = create_test_civ(0);
        let cell = graph.id_at(0, 0).unwrap();
        civ.claim_cell(&mut graph, cell);

        let record = civ.determine_action(&graph, 2);
        assert_eq!(
            record.action(),
            Action::Expand {
                target: graph.id_at(0, 1).unwrap()
            }
        );
        assert_eq!(record.civ(), CivId(0));
        assert_eq!(record.tick(), 2);
    }

    #[test]
    fn test_expand_tie_goes_to_lowest_id() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();
        civ.claim_cell(&mut graph, origin);

        let lowest = *civ.frontier().iter().next().unwrap();
        assert_eq!(civ.best_expansion_target(&graph), Some(lowest));
    }

    #[test]
    fn test_propensity_tie_goes_to_first_action() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        civ.propensities = Propensities {
            expand: 0.5,
            exploit: 0.5,
            explore: 0.5,
            exterminate: 0.5,
        };
        let cell = graph.id_at(0, 0).unwrap();
        civ.claim_cell(&mut graph, cell);
        assert_eq!(civ.determine_action(&graph, 1).kind(), ActionKind::Expand);
    }

    #[test]
    fn test_exterminate_targets_neighbour() {
        let mut graph = create_test_graph();
        let mut a = create_test_civ(0);
        let mut b = create_test_civ(1);
        a.propensities.exterminate = 5.0;
        let cell = graph.id_at(0, 0).unwrap();
        a.claim_cell(&mut graph, cell);
        let cell = graph.id_at(1, 0).unwrap();
        b.claim_cell(&mut graph, cell);

        let record = a.determine_action(&graph, 1);
        assert_eq!(record.action(), Action::Exterminate { target: CivId(1) });

        a.add_war(CivId(1));
        assert_ne!(a.determine_action(&graph, 1).kind(), ActionKind::Exterminate);
    }

    #[test]
    fn test_casualties_clamp_at_zero() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();
        civ.claim_cell(&mut graph, origin);
        graph.cell_mut(origin).population = 100;
        civ.refresh_population(&graph);

        let touched = civ.apply_casualties(&mut graph, 175);
        assert_eq!(touched, vec![origin]);
        assert_eq!(civ.population, 0);
        assert_eq!(graph.cell(origin).population, 0);
    }

    #[test]
    fn test_negative_casualties_add_population() {
        let mut graph = create_test_graph();
        let mut civ = create_test_civ(0);
        let origin = graph.id_at(0, 0).unwrap();
        civ.claim_cell(&mut graph, origin);
        graph.cell_mut(origin).population = 10;
        civ.refresh_population(&graph);

        civ.apply_casualties(&mut graph, -40);
        assert_eq!(civ.population, 50);
        assert_eq!(graph.cell(origin).population, 50);
        assert_eq!(graph.cell(origin).settlement, SettlementTier::Small);
    }

    #[test]
    fn test_war_list_bookkeeping() {
        let mut civ = create_test_civ(0);
        civ.add_war(CivId(2));
        civ.add_war(CivId(2));
        assert_eq!(civ.war_count(), 1);
        assert!(civ.is_at_war_with(CivId(2)));
        civ.remove_war(CivId(2));
        assert_eq!(civ.war_count(), 0);
    }
}
