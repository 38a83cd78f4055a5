//! Arena snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of grid occupancy and
//! placed deployables for hosts and inspectors. It is a read-only view, not
//! a save format.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::grid::OccupancyGrid;
use crate::input::EditorMode;
use crate::properties::DeployableProperties;

/// One occupied grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub col: i32,
    pub row: i32,
    /// `Entity::to_bits` of the occupant.
    pub occupant: u64,
}

/// One deployable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployableSnapshot {
    pub id: u64,
    pub kind: u32,
    pub display_name: String,
    pub method: String,
    /// `None` while grabbed.
    pub anchor: Option<(i32, i32)>,
    pub x: f32,
    pub y: f32,
    pub active: bool,
    pub play_ticks: u64,
}

/// Complete arena state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current editor tick.
    pub tick: u64,
    /// Mode the controller is in.
    pub mode: String,
    pub columns: u32,
    pub rows: u32,
    pub cell_width: f32,
    /// Occupied cells only, row by row.
    pub occupied: Vec<CellSnapshot>,
    /// All deployables, sorted by id.
    pub deployables: Vec<DeployableSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, mode: EditorMode) -> Self {
        let mut deployables = Vec::new();

        let mut query = world.query::<(
            Entity,
            &Deployable,
            &AnchorCell,
            &Position,
            &DeployableProperties,
            &PlayTicks,
        )>();

        for (entity, deployable, anchor, pos, props, ticks) in query.iter(world) {
            deployables.push(DeployableSnapshot {
                id: entity.to_bits(),
                kind: deployable.kind.0,
                display_name: props.display_name.clone(),
                method: deployable.method.as_str().to_string(),
                anchor: anchor.0.map(|c| (c.col, c.row)),
                x: pos.x,
                y: pos.y,
                active: props.active,
                play_ticks: ticks.0,
            });
        }
        deployables.sort_by_key(|d| d.id);

        let grid = world.resource::<OccupancyGrid>();
        let occupied = grid
            .cells()
            .filter_map(|cell| {
                cell.occupant().map(|occupant| CellSnapshot {
                    col: cell.index.col,
                    row: cell.index.row,
                    occupant: occupant.to_bits(),
                })
            })
            .collect();

        Self {
            tick,
            mode: mode.as_str().to_string(),
            columns: grid.columns(),
            rows: grid.rows(),
            cell_width: grid.cell_width(),
            occupied,
            deployables,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
