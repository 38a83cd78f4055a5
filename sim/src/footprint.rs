//! Footprints - the cell mask a deployable type covers on the grid.
//!
//! A footprint is a `width x height` boolean mask of tile offsets `(dx, dy)`
//! relative to an anchor cell. Anchoring at `(col, row)` covers
//! `(col + dx, row + dy)` for every set mask bit.
//!
//! The rendered footprint is centered on its anchor instead of hanging off
//! the anchor's top-left corner. [`centered_position`] is the only place that
//! math lives: spawn, commit and revert all go through it, so snapping an
//! entity back to the same cell reproduces its position bit for bit.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::components::Position;
use crate::error::FootprintError;
use crate::grid::{CellIndex, OccupancyGrid};

/// Immutable occupancy mask for a deployable type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    width: u32,
    height: u32,
    /// Row-major, `width * height` entries.
    mask: Vec<bool>,
}

impl Footprint {
    /// A fully occupied `width x height` rectangle.
    pub fn solid(width: u32, height: u32) -> Result<Self, FootprintError> {
        match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(width), Some(height)) => Ok(Self::rect(width, height)),
            _ => Err(FootprintError::Empty),
        }
    }

    /// [`Footprint::solid`] for sizes known to be non-zero.
    pub fn rect(width: NonZeroU32, height: NonZeroU32) -> Self {
        let (width, height) = (width.get(), height.get());
        Self {
            width,
            height,
            mask: vec![true; width as usize * height as usize],
        }
    }

    /// Single-cell footprint.
    pub fn single() -> Self {
        Self {
            width: 1,
            height: 1,
            mask: vec![true],
        }
    }

    /// Parse a mask drawn as text rows: `#` is occupied, `.` is a hole.
    ///
    /// ```
    /// use arena_sim::Footprint;
    ///
    /// let l_shape = Footprint::from_rows(&["#.", "##"]).unwrap();
    /// assert_eq!(l_shape.occupied_count(), 3);
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, FootprintError> {
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(FootprintError::Empty);
        }

        let mut mask = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(FootprintError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for c in line.chars() {
                match c {
                    '#' => mask.push(true),
                    '.' => mask.push(false),
                    other => return Err(FootprintError::InvalidChar { row, found: other }),
                }
            }
        }

        if !mask.iter().any(|&b| b) {
            return Err(FootprintError::Empty);
        }

        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            mask,
        })
    }

    /// Width in grid cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in grid cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the mask covers offset `(dx, dy)`.
    pub fn covers(&self, dx: i32, dy: i32) -> bool {
        if dx < 0 || dy < 0 || dx >= self.width as i32 || dy >= self.height as i32 {
            return false;
        }
        self.mask[(dy as u32 * self.width + dx as u32) as usize]
    }

    /// Set mask offsets as `(dx, dy)`, row by row.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width;
        self.mask
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(move |(i, _)| ((i as u32 % width) as i32, (i as u32 / width) as i32))
    }

    /// Cells covered when anchored at `anchor`, in or out of grid bounds.
    pub fn translate(&self, anchor: CellIndex) -> impl Iterator<Item = CellIndex> + '_ {
        self.offsets()
            .map(move |(dx, dy)| CellIndex::new(anchor.col + dx, anchor.row + dy))
    }

    pub fn occupied_count(&self) -> usize {
        self.mask.iter().filter(|&&b| b).count()
    }

    /// World offset from the anchor cell's center to the footprint's center.
    ///
    /// Horizontal: `width/2 * w - w/2`. Vertical is the mirrored form because
    /// rows grow toward -y.
    pub fn world_offset(&self, cell_width: f32) -> (f32, f32) {
        let half = cell_width / 2.0;
        (
            self.width as f32 / 2.0 * cell_width - half,
            -(self.height as f32 / 2.0 * cell_width - half),
        )
    }
}

/// World position a footprint anchored at `cell` is rendered and snapped to.
pub fn centered_position(grid: &OccupancyGrid, footprint: &Footprint, cell: CellIndex) -> Position {
    let (dx, dy) = footprint.world_offset(grid.cell_width());
    grid.cell_center(cell).offset(dx, dy)
}
