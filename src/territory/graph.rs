//! TerritoryGraph - the hexagonal map every civilization competes over
//!
//! Topology is fixed at construction: cells are enumerated once, neighbor
//! lists are precomputed, and only per-cell fields change afterwards.

use ahash::AHashMap;

use crate::core::types::{CellId, CivId};
use crate::territory::cell::{Cell, CellProfile};
use crate::territory::hex::HexCoord;

#[derive(Debug, Clone)]
pub struct TerritoryGraph {
    radius: i32,
    cells: Vec<Cell>,
    index: AHashMap<HexCoord, CellId>,
}

impl TerritoryGraph {
    /// Build a hexagon of `radius` rings around the origin
    ///
    /// `profile` is called once per coordinate, in id order.
    pub fn build(radius: u32, mut profile: impl FnMut(HexCoord) -> CellProfile) -> Self {
        let coords = HexCoord::ORIGIN.hexes_in_range(radius);

        let mut cells = Vec::with_capacity(coords.len());
        let mut index = AHashMap::with_capacity(coords.len());
        for (i, coord) in coords.into_iter().enumerate() {
            let id = CellId(i as u32);
            index.insert(coord, id);
            cells.push(Cell::new(id, coord, profile(coord)));
        }

        for cell in &mut cells {
            cell.neighbours = cell
                .coord
                .neighbors()
                .iter()
                .filter_map(|n| index.get(n).copied())
                .collect();
        }

        Self {
            radius: radius as i32,
            cells,
            index,
        }
    }

    /// Uniform terrain, mostly for tests and benches
    pub fn uniform(radius: u32, profile: CellProfile) -> Self {
        Self::build(radius, |_| profile)
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Coordinate validity gate; every lookup goes through this
    pub fn is_valid(&self, q: i32, r: i32) -> bool {
        HexCoord::new(q, r).within_radius(self.radius)
    }

    pub fn contains(&self, id: CellId) -> bool {
        id.index() < self.cells.len()
    }

    pub fn id_at(&self, q: i32, r: i32) -> Option<CellId> {
        if !self.is_valid(q, r) {
            return None;
        }
        self.index.get(&HexCoord::new(q, r)).copied()
    }

    /// Cell at an axial coordinate, or `None` outside the map
    pub fn get_cell(&self, q: i32, r: i32) -> Option<&Cell> {
        self.id_at(q, r).map(|id| &self.cells[id.index()])
    }

    /// Cells adjacent to (q, r) in fixed direction order; empty outside the map
    pub fn neighbours(&self, q: i32, r: i32) -> Vec<&Cell> {
        match self.get_cell(q, r) {
            Some(cell) => cell
                .neighbours
                .iter()
                .map(|id| &self.cells[id.index()])
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn neighbour_ids(&self, id: CellId) -> &[CellId] {
        &self.cells[id.index()].neighbours
    }

    /// Cell by id. Ids only originate from this graph, so an unknown id is a bug.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn owner_of(&self, id: CellId) -> Option<CivId> {
        self.cells[id.index()].owner
    }
}
