//! Occupancy grid - the single shared mutable resource of the arena.
//!
//! Each cell records which deployable (if any) covers it. The grid answers
//! footprint-fit queries and applies occupancy changes; it never owns the
//! deployables themselves, only their `Entity` ids.
//!
//! ## Contract
//!
//! Occupying a cell that already belongs to a different entity is a caller
//! bug. `set_occupancy` checks every covered cell before touching any of
//! them and returns `OccupancyError::ContractViolation` without writing, so
//! a rejected call leaves the grid exactly as it was.

use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Position;
use crate::error::OccupancyError;
use crate::footprint::Footprint;

/// Column/row coordinate of a grid cell. May point outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CellIndex {
    pub col: i32,
    pub row: i32,
}

impl CellIndex {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Requested occupancy for `set_occupancy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Full,
    Empty,
}

/// A single grid slot.
///
/// Emptiness is derived from the occupant, so a cell can never claim to be
/// full without naming who fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub index: CellIndex,
    occupant: Option<Entity>,
}

impl GridCell {
    fn new(index: CellIndex) -> Self {
        Self {
            index,
            occupant: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn occupant(&self) -> Option<Entity> {
        self.occupant
    }
}

/// 2D grid of cells with a world-space layout.
///
/// `origin` is the world position of the grid's top-left corner; columns grow
/// toward +x and rows toward -y.
#[derive(Resource, Debug, Clone)]
pub struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cell_width: f32,
    origin: Position,
    cells: Vec<GridCell>,
}

impl OccupancyGrid {
    /// Create an empty grid with its top-left corner at the world origin.
    pub fn new(columns: u32, rows: u32, cell_width: f32) -> Self {
        Self::with_origin(columns, rows, cell_width, Position::default())
    }

    pub fn with_origin(columns: u32, rows: u32, cell_width: f32, origin: Position) -> Self {
        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows as i32 {
            for col in 0..columns as i32 {
                cells.push(GridCell::new(CellIndex::new(col, row)));
            }
        }
        Self {
            columns,
            rows,
            cell_width,
            origin,
            cells,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    #[inline]
    fn slot(&self, index: CellIndex) -> Option<usize> {
        if index.col < 0
            || index.row < 0
            || i64::from(index.col) >= i64::from(self.columns)
            || i64::from(index.row) >= i64::from(self.rows)
        {
            return None;
        }
        Some(index.row as usize * self.columns as usize + index.col as usize)
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        self.slot(index).is_some()
    }

    /// Bounds-checked cell lookup.
    pub fn cell_at(&self, col: i32, row: i32) -> Option<&GridCell> {
        self.cell(CellIndex::new(col, row))
    }

    pub fn cell(&self, index: CellIndex) -> Option<&GridCell> {
        self.slot(index).map(|i| &self.cells[i])
    }

    /// Occupant of a cell, `None` when empty or out of bounds.
    pub fn occupant_at(&self, index: CellIndex) -> Option<Entity> {
        self.cell(index).and_then(GridCell::occupant)
    }

    /// All cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Cells currently owned by `entity`.
    pub fn occupied_cells(&self, entity: Entity) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells
            .iter()
            .filter(move |c| c.occupant == Some(entity))
            .map(|c| c.index)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    // ------------------------------------------------------------------------
    // World layout
    // ------------------------------------------------------------------------

    /// World position of a cell's center (also defined outside the grid).
    pub fn cell_center(&self, index: CellIndex) -> Position {
        Position::new(
            self.origin.x + (index.col as f32 + 0.5) * self.cell_width,
            self.origin.y - (index.row as f32 + 0.5) * self.cell_width,
        )
    }

    /// Cell containing a world point, `None` outside the grid.
    pub fn world_to_cell(&self, pos: Position) -> Option<CellIndex> {
        let col = ((pos.x - self.origin.x) / self.cell_width).floor();
        let row = ((self.origin.y - pos.y) / self.cell_width).floor();
        if !col.is_finite() || !row.is_finite() {
            return None;
        }
        let index = CellIndex::new(col as i32, row as i32);
        self.contains(index).then_some(index)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Whether `footprint` anchored at `target` lies fully inside the grid on
    /// empty cells. Pure query.
    pub fn is_placeable(&self, footprint: &Footprint, target: CellIndex) -> bool {
        footprint
            .translate(target)
            .all(|cell| self.cell(cell).is_some_and(GridCell::is_empty))
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Apply `state` to every cell `footprint` covers when anchored at `anchor`.
    ///
    /// Offsets outside the grid are skipped. `Full` fails without writing if
    /// any covered cell belongs to another entity; `Empty` only releases cells
    /// owned by `entity`. Returns the cells that changed.
    pub fn set_occupancy(
        &mut self,
        entity: Entity,
        footprint: &Footprint,
        anchor: CellIndex,
        state: CellState,
    ) -> Result<Vec<CellIndex>, OccupancyError> {
        let covered: Vec<usize> = footprint
            .translate(anchor)
            .filter_map(|cell| self.slot(cell))
            .collect();

        match state {
            CellState::Full => {
                self.check_claim(entity, &covered)?;
                Ok(self.write(entity, &covered))
            }
            CellState::Empty => {
                let mut released = Vec::new();
                for slot in covered {
                    let cell = &mut self.cells[slot];
                    if cell.occupant == Some(entity) {
                        cell.occupant = None;
                        released.push(cell.index);
                    }
                }
                Ok(released)
            }
        }
    }

    /// Re-claim an exact list of cells for `entity`, e.g. the cells released
    /// when it was grabbed.
    pub fn claim_cells(&mut self, entity: Entity, cells: &[CellIndex]) -> Result<Vec<CellIndex>, OccupancyError> {
        let slots: Vec<usize> = cells.iter().filter_map(|&c| self.slot(c)).collect();
        self.check_claim(entity, &slots)?;
        Ok(self.write(entity, &slots))
    }

    /// Claim whatever covered cells are in bounds and empty, skipping the rest.
    ///
    /// Only the legacy unvalidated drag-release commit uses this.
    pub fn occupy_available(&mut self, entity: Entity, footprint: &Footprint, anchor: CellIndex) -> Vec<CellIndex> {
        let mut claimed = Vec::new();
        for cell in footprint.translate(anchor) {
            let Some(slot) = self.slot(cell) else {
                tracing::trace!(%cell, "skipping out-of-bounds footprint offset");
                continue;
            };
            let target = &mut self.cells[slot];
            match target.occupant {
                None => {
                    target.occupant = Some(entity);
                    claimed.push(cell);
                }
                Some(owner) if owner == entity => {}
                Some(owner) => {
                    tracing::warn!(%cell, ?owner, ?entity, "unvalidated commit overlaps an occupied cell");
                }
            }
        }
        claimed
    }

    fn check_claim(&self, entity: Entity, slots: &[usize]) -> Result<(), OccupancyError> {
        for &slot in slots {
            let cell = &self.cells[slot];
            if let Some(occupant) = cell.occupant {
                if occupant != entity {
                    return Err(OccupancyError::ContractViolation {
                        cell: cell.index,
                        occupant,
                        requested: entity,
                    });
                }
            }
        }
        Ok(())
    }

    fn write(&mut self, entity: Entity, slots: &[usize]) -> Vec<CellIndex> {
        slots
            .iter()
            .map(|&slot| {
                let cell = &mut self.cells[slot];
                cell.occupant = Some(entity);
                cell.index
            })
            .collect()
    }
}
