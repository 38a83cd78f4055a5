//! ECS components for placed deployables.
//!
//! A deployable is an ordinary ECS entity. The grid refers to it by `Entity`
//! id only, so the entity's storage is owned by the world alone.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::footprint::Footprint;
use crate::grid::CellIndex;
use crate::properties::DeployableProperties;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D world position (x = east/west, y = north/south; grid rows grow toward -y).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Vector from `other` to `self`.
    pub fn delta_from(&self, other: &Position) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Cell the deployable's footprint is translated from.
///
/// `None` while the entity is grabbed in edit mode.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorCell(pub Option<CellIndex>);

impl AnchorCell {
    pub fn is_placed(&self) -> bool {
        self.0.is_some()
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Index of a deployable type in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeployableKindId(pub u32);

/// How a deployable type is put onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeploymentMethod {
    /// Placed immediately on press, and on every valid cell brushed while held.
    #[default]
    Brush,
    /// Placed once, at the last visited cell, when the pointer is released.
    Drag,
}

impl DeploymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMethod::Brush => "Brush",
            DeploymentMethod::Drag => "Drag",
        }
    }
}

/// Type data shared by every instance of a deployable kind.
#[derive(Component, Debug, Clone)]
pub struct Deployable {
    pub kind: DeployableKindId,
    pub method: DeploymentMethod,
    pub footprint: Arc<Footprint>,
}

// ============================================================================
// PLAY MODE COMPONENTS
// ============================================================================

/// Number of play-mode ticks this deployable has been active for.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayTicks(pub u64);

// ============================================================================
// BUNDLES
// ============================================================================

/// Everything a freshly committed deployable is spawned with.
#[derive(Bundle)]
pub struct DeployableBundle {
    pub deployable: Deployable,
    pub anchor: AnchorCell,
    pub position: Position,
    pub properties: DeployableProperties,
    pub play_ticks: PlayTicks,
}
