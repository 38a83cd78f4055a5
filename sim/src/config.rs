//! Arena configuration.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Position;
use crate::error::{ArenaError, ArenaResult};
use crate::grid::OccupancyGrid;
use crate::input::EditorMode;

/// Grid layout and interaction policy.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Cell edge length in world units.
    pub cell_width: f32,
    /// World position of the grid's top-left corner.
    pub origin: (f32, f32),
    /// Re-check fit when a drag placement is released.
    ///
    /// `false` keeps the legacy behavior: the deployable is committed at the
    /// last visited cell without checking it.
    pub validate_on_release: bool,
    /// Mode the controller starts in.
    pub initial_mode: EditorMode,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
            cell_width: 1.0,
            origin: (0.0, 0.0),
            validate_on_release: false,
            initial_mode: EditorMode::Edit,
        }
    }
}

impl ArenaConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ArenaResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ArenaResult<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ArenaError::InvalidConfig(format!(
                "grid must have at least one cell, got {}x{}",
                self.columns, self.rows
            )));
        }
        if self.columns > i32::MAX as u32 || self.rows > i32::MAX as u32 {
            return Err(ArenaError::InvalidConfig(format!(
                "grid dimensions must fit cell coordinates, got {}x{}",
                self.columns, self.rows
            )));
        }
        if (self.columns as usize).checked_mul(self.rows as usize).is_none() {
            return Err(ArenaError::InvalidConfig(format!(
                "grid of {}x{} cells is too large",
                self.columns, self.rows
            )));
        }
        if !self.cell_width.is_finite() || self.cell_width <= 0.0 {
            return Err(ArenaError::InvalidConfig(format!(
                "cell_width must be positive, got {}",
                self.cell_width
            )));
        }
        if !self.origin.0.is_finite() || !self.origin.1.is_finite() {
            return Err(ArenaError::InvalidConfig("origin must be finite".to_string()));
        }
        Ok(())
    }

    /// Empty grid laid out per this config.
    pub fn build_grid(&self) -> OccupancyGrid {
        OccupancyGrid::with_origin(
            self.columns,
            self.rows,
            self.cell_width,
            Position::new(self.origin.0, self.origin.1),
        )
    }
}
