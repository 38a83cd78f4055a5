//! Erase mode - sweeping the pointer over deployables removes them.
//!
//! The target is the occupant of the cell under the pointer, or, over an
//! empty cell, the placed deployable drawn there.
//!
//! Removal is two steps in a fixed order: the occupant's cells are released
//! first, then the entity is despawned, so no cell ever names a dead entity.

use bevy_ecs::prelude::*;

use crate::controller::{InteractionController, InteractionEvent, TickReport};
use crate::error::ArenaResult;
use crate::grid::{CellIndex, OccupancyGrid};
use crate::input::PointerInput;
use crate::scene::SceneQuery;
use crate::systems::placement::{pick_cell, pick_entity, vacate};

impl InteractionController {
    pub(crate) fn erase_update(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        if input.pressed {
            self.pointer_down = true;
        }

        if self.pointer_down && input.is_down() {
            if let Some(cell) = pick_cell(world, scene, input.position) {
                let mut occupant = world.resource::<OccupancyGrid>().occupant_at(cell);
                if occupant.is_none() {
                    // An unvalidated drag commit can leave a deployable that owns
                    // none of the cells it covers.
                    occupant = pick_entity(world, scene, input.position);
                }
                if let Some(entity) = occupant {
                    erase(world, entity, cell, report)?;
                }
            }
        }

        if input.released {
            self.pointer_down = false;
        }
        Ok(())
    }
}

fn erase(world: &mut World, entity: Entity, cell: CellIndex, report: &mut TickReport) -> ArenaResult<()> {
    let released = vacate(world, entity)?;
    world.despawn(entity);
    tracing::debug!(?entity, %cell, cells = released.len(), "deployable erased");
    report.push(InteractionEvent::Erased { entity, cell });
    Ok(())
}
