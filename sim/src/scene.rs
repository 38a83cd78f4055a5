//! Pointer picking - resolving a pointer position to a grid cell or a placed
//! deployable.
//!
//! Hosts with real scene geometry implement [`SceneQuery`] on top of their
//! own ray casts. [`PlanarSceneQuery`] covers the headless case: an
//! orthographic top-down view where the pointer is already in world space.

use std::sync::Arc;

use bevy_ecs::entity::Entity;

use crate::components::Position;
use crate::footprint::Footprint;
use crate::grid::{CellIndex, OccupancyGrid};

/// Which surfaces a query may hit. The two masks are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionMask {
    /// Grid cell surfaces only.
    GridCells,
    /// Placed deployables only.
    PlacedEntities,
}

/// Result of a successful pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneHit {
    Cell(CellIndex),
    Entity(Entity),
}

impl SceneHit {
    pub fn cell(self) -> Option<CellIndex> {
        match self {
            SceneHit::Cell(cell) => Some(cell),
            SceneHit::Entity(_) => None,
        }
    }

    pub fn entity(self) -> Option<Entity> {
        match self {
            SceneHit::Entity(entity) => Some(entity),
            SceneHit::Cell(_) => None,
        }
    }
}

/// A placed deployable that can be picked.
#[derive(Debug, Clone)]
pub struct PickTarget {
    pub entity: Entity,
    /// Rendered (centered) position.
    pub position: Position,
    pub footprint: Arc<Footprint>,
}

/// What a query can see this tick.
pub struct SceneView<'a> {
    pub grid: &'a OccupancyGrid,
    pub targets: &'a [PickTarget],
}

/// Spatial query collaborator.
pub trait SceneQuery: Send + Sync {
    /// First surface under `pointer` allowed by `mask`, if any.
    fn query_at(&self, scene: &SceneView<'_>, pointer: Position, mask: CollisionMask) -> Option<SceneHit>;
}

/// Top-down orthographic picking against grid geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarSceneQuery;

impl PlanarSceneQuery {
    /// Point test against a target's rendered footprint, holes excluded.
    fn hits_target(grid: &OccupancyGrid, target: &PickTarget, pointer: Position) -> bool {
        let w = grid.cell_width();
        let fp = &target.footprint;
        let left = target.position.x - fp.width() as f32 * w / 2.0;
        let top = target.position.y + fp.height() as f32 * w / 2.0;
        let dx = ((pointer.x - left) / w).floor();
        let dy = ((top - pointer.y) / w).floor();
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        fp.covers(dx as i32, dy as i32)
    }
}

impl SceneQuery for PlanarSceneQuery {
    fn query_at(&self, scene: &SceneView<'_>, pointer: Position, mask: CollisionMask) -> Option<SceneHit> {
        match mask {
            CollisionMask::GridCells => scene.grid.world_to_cell(pointer).map(SceneHit::Cell),
            CollisionMask::PlacedEntities => scene
                .targets
                .iter()
                .find(|t| Self::hits_target(scene.grid, t, pointer))
                .map(|t| SceneHit::Entity(t.entity)),
        }
    }
}
