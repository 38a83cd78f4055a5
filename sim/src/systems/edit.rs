//! Edit mode - grabbing a placed deployable and dropping it elsewhere.
//!
//! The press lifts the entity off the grid (its cells are released so it can
//! be dropped over its own old footprint) and remembers where the pointer
//! held it. While held the entity follows the pointer. On release it either
//! snaps to the cell under the pointer, or goes back to where it was: same
//! centered position, same cells.

use bevy_ecs::prelude::*;

use crate::components::{AnchorCell, Position};
use crate::controller::{Grab, InteractionController, InteractionEvent, RejectReason, TickReport};
use crate::error::ArenaResult;
use crate::grid::{CellState, OccupancyGrid};
use crate::input::PointerInput;
use crate::scene::SceneQuery;
use crate::systems::placement::{can_place, footprint_and_anchor, pick_cell, pick_entity, snap_to, vacate};

impl InteractionController {
    pub(crate) fn edit_update(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        if input.pressed {
            // Missed release: finish the previous gesture before starting another.
            if self.grab.is_some() {
                self.revert_grab(world, report)?;
            }
            self.pointer_down = true;
            self.begin_grab(world, scene, input.position, report)?;
        }

        if input.is_down() {
            if let Some(grab) = &self.grab {
                let target = input.position.offset(grab.offset.0, grab.offset.1);
                if let Some(mut pos) = world.get_mut::<Position>(grab.entity) {
                    *pos = target;
                }
            }
        }

        if input.released {
            self.pointer_down = false;
            if self.grab.is_some() {
                self.drop_grab(world, scene, input.position, report)?;
            }
        }
        Ok(())
    }

    fn begin_grab(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        pointer: Position,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        let Some(entity) = pick_entity(world, scene, pointer) else {
            report.reject(RejectReason::NoTarget, None);
            return Ok(());
        };
        let Some(origin) = world.get::<AnchorCell>(entity).and_then(|a| a.0) else {
            return Ok(());
        };
        let Some(position) = world.get::<Position>(entity).copied() else {
            return Ok(());
        };

        let released = vacate(world, entity)?;
        if let Some(mut anchor) = world.get_mut::<AnchorCell>(entity) {
            anchor.0 = None;
        }

        tracing::debug!(?entity, %origin, "deployable grabbed");
        self.grab = Some(Grab {
            entity,
            origin,
            released,
            offset: position.delta_from(&pointer),
        });
        report.push(InteractionEvent::Grabbed { entity, from: origin });
        Ok(())
    }

    fn drop_grab(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        pointer: Position,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        let Some(grab) = self.grab.take() else {
            return Ok(());
        };
        let (footprint, _) = footprint_and_anchor(world, grab.entity)?;

        let target = match pick_cell(world, scene, pointer) {
            Some(cell) if can_place(world, &footprint, cell) => cell,
            Some(cell) => {
                report.reject(RejectReason::InvalidPlacement, Some(cell));
                return self.restore(world, grab, report);
            }
            None => {
                report.reject(RejectReason::NoTarget, None);
                return self.restore(world, grab, report);
            }
        };

        let result = world
            .resource_mut::<OccupancyGrid>()
            .set_occupancy(grab.entity, &footprint, target, CellState::Full);
        if let Err(err) = result {
            tracing::error!(%err, "refusing to overwrite occupancy on drop");
            self.restore(world, grab, report)?;
            return Err(err.into());
        }

        snap_to(world, grab.entity, &footprint, target);
        tracing::debug!(entity = ?grab.entity, from = %grab.origin, to = %target, "deployable moved");
        report.push(InteractionEvent::Moved {
            entity: grab.entity,
            from: grab.origin,
            to: target,
        });
        Ok(())
    }

    /// Undo the active grab, if any.
    pub(crate) fn revert_grab(&mut self, world: &mut World, report: &mut TickReport) -> ArenaResult<()> {
        match self.grab.take() {
            Some(grab) => self.restore(world, grab, report),
            None => Ok(()),
        }
    }

    /// Put a grabbed entity back at its origin and re-claim exactly the cells
    /// it released.
    ///
    /// If the cells were taken in the meantime the grab stays active, so the
    /// entity is never left both unanchored and unreachable.
    fn restore(&mut self, world: &mut World, grab: Grab, report: &mut TickReport) -> ArenaResult<()> {
        let (footprint, _) = footprint_and_anchor(world, grab.entity)?;
        let result = world
            .resource_mut::<OccupancyGrid>()
            .claim_cells(grab.entity, &grab.released);
        if let Err(err) = result {
            tracing::error!(%err, entity = ?grab.entity, "cannot revert grab, its cells were taken");
            self.grab = Some(grab);
            return Err(err.into());
        }
        snap_to(world, grab.entity, &footprint, grab.origin);

        tracing::debug!(entity = ?grab.entity, cell = %grab.origin, "deployable reverted");
        report.push(InteractionEvent::Reverted {
            entity: grab.entity,
            cell: grab.origin,
        });
        Ok(())
    }
}
