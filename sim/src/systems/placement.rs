//! World-level placement helpers shared by the mode handlers.
//!
//! Every spawn, snap and revert positions the entity through
//! `centered_position`, so the same anchor always yields the same position.

use bevy_ecs::prelude::*;

use crate::catalog::{DeployableCatalog, DeployableType};
use crate::components::*;
use crate::error::{ArenaError, ArenaResult};
use crate::footprint::{centered_position, Footprint};
use crate::grid::{CellIndex, CellState, GridCell, OccupancyGrid};
use crate::scene::{CollisionMask, PickTarget, SceneHit, SceneQuery, SceneView};

/// Catalog entry for `kind`, cloned out of the world.
pub(crate) fn deployable_type(world: &World, kind: DeployableKindId) -> ArenaResult<DeployableType> {
    world.resource::<DeployableCatalog>().require(kind).cloned()
}

/// Grid cell under the pointer, through the grid-cell mask.
pub(crate) fn pick_cell(world: &World, scene: &dyn SceneQuery, pointer: Position) -> Option<CellIndex> {
    let view = SceneView {
        grid: world.resource::<OccupancyGrid>(),
        targets: &[],
    };
    scene
        .query_at(&view, pointer, CollisionMask::GridCells)
        .and_then(SceneHit::cell)
}

/// Placed deployable under the pointer, through the placed-entity mask.
pub(crate) fn pick_entity(world: &mut World, scene: &dyn SceneQuery, pointer: Position) -> Option<Entity> {
    let targets = pick_targets(world);
    let view = SceneView {
        grid: world.resource::<OccupancyGrid>(),
        targets: &targets,
    };
    scene
        .query_at(&view, pointer, CollisionMask::PlacedEntities)
        .and_then(SceneHit::entity)
}

fn pick_targets(world: &mut World) -> Vec<PickTarget> {
    let mut query = world.query::<(Entity, &Deployable, &Position, &AnchorCell)>();
    query
        .iter(world)
        .filter(|(_, _, _, anchor)| anchor.is_placed())
        .map(|(entity, deployable, position, _)| PickTarget {
            entity,
            position: *position,
            footprint: deployable.footprint.clone(),
        })
        .collect()
}

/// Whether a placement of `footprint` at `cell` would be accepted.
pub(crate) fn can_place(world: &World, footprint: &Footprint, cell: CellIndex) -> bool {
    let grid = world.resource::<OccupancyGrid>();
    grid.cell(cell).is_some_and(GridCell::is_empty) && grid.is_placeable(footprint, cell)
}

/// Spawn a deployable anchored at `cell` without touching occupancy.
pub(crate) fn spawn_at(world: &mut World, kind: &DeployableType, cell: CellIndex) -> Entity {
    let position = centered_position(world.resource::<OccupancyGrid>(), &kind.footprint, cell);
    world
        .spawn(DeployableBundle {
            deployable: Deployable {
                kind: kind.id,
                method: kind.method,
                footprint: kind.footprint.clone(),
            },
            anchor: AnchorCell(Some(cell)),
            position,
            properties: kind.default_properties(),
            play_ticks: PlayTicks::default(),
        })
        .id()
}

/// Spawn and occupy. The caller has already checked `can_place`.
pub(crate) fn place_checked(world: &mut World, kind: &DeployableType, cell: CellIndex) -> ArenaResult<Entity> {
    let entity = spawn_at(world, kind, cell);
    let result = world
        .resource_mut::<OccupancyGrid>()
        .set_occupancy(entity, &kind.footprint, cell, CellState::Full);

    if let Err(err) = result {
        tracing::error!(%err, "refusing to overwrite occupancy");
        world.despawn(entity);
        return Err(err.into());
    }

    tracing::debug!(?entity, kind = kind.display_name.as_str(), %cell, "deployable placed");
    Ok(entity)
}

/// Footprint and anchor of a live deployable.
pub(crate) fn footprint_and_anchor(
    world: &World,
    entity: Entity,
) -> ArenaResult<(std::sync::Arc<Footprint>, Option<CellIndex>)> {
    let deployable = world
        .get::<Deployable>(entity)
        .ok_or(ArenaError::EntityNotFound(entity))?;
    let anchor = world.get::<AnchorCell>(entity).and_then(|a| a.0);
    Ok((deployable.footprint.clone(), anchor))
}

/// Release every cell `entity` covers at its anchor. Returns the released cells.
pub(crate) fn vacate(world: &mut World, entity: Entity) -> ArenaResult<Vec<CellIndex>> {
    let (footprint, anchor) = footprint_and_anchor(world, entity)?;
    let Some(anchor) = anchor else {
        return Ok(Vec::new());
    };
    let released = world
        .resource_mut::<OccupancyGrid>()
        .set_occupancy(entity, &footprint, anchor, CellState::Empty)?;
    Ok(released)
}

/// Move `entity` to its centered position at `cell` and anchor it there.
pub(crate) fn snap_to(world: &mut World, entity: Entity, footprint: &Footprint, cell: CellIndex) {
    let position = centered_position(world.resource::<OccupancyGrid>(), footprint, cell);
    if let Some(mut pos) = world.get_mut::<Position>(entity) {
        *pos = position;
    }
    if let Some(mut anchor) = world.get_mut::<AnchorCell>(entity) {
        anchor.0 = Some(cell);
    }
}
