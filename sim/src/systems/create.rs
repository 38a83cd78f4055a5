//! Create mode - spawning deployables by brush or by drag.
//!
//! **Brush**: every press, and every sample while the pointer stays down,
//! places the candidate at the cell under the pointer if it is empty and the
//! footprint fits.
//!
//! **Drag**: a press arms a pending placement. Each sample overwrites the
//! last visited cell without validating it; the release commits there. With
//! `validate_on_release` off (the default), the commit is unconditional and
//! only claims the footprint cells that are in bounds and free.

use bevy_ecs::prelude::*;

use crate::catalog::DeployableType;
use crate::components::DeploymentMethod;
use crate::controller::{InteractionController, InteractionEvent, RejectReason, TickReport};
use crate::error::ArenaResult;
use crate::grid::{CellIndex, OccupancyGrid};
use crate::input::PointerInput;
use crate::scene::SceneQuery;
use crate::systems::placement::{can_place, deployable_type, pick_cell, place_checked, spawn_at};

impl InteractionController {
    pub(crate) fn create_update(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        let Some(kind) = self.candidate else {
            if input.released {
                self.pointer_down = false;
            }
            return Ok(());
        };
        let kind = deployable_type(world, kind)?;

        match kind.method {
            DeploymentMethod::Brush => self.brush_update(world, scene, input, &kind, report),
            DeploymentMethod::Drag => self.drag_update(world, scene, input, &kind, report),
        }
    }

    fn brush_update(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        kind: &DeployableType,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        if input.pressed {
            self.pointer_down = true;
        }
        if self.pointer_down && input.is_down() {
            self.brush_sample(world, scene, input, kind, report)?;
        }
        if input.released {
            self.pointer_down = false;
        }
        Ok(())
    }

    fn brush_sample(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        kind: &DeployableType,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        // Only the press reports rejections; dragging a brush over occupied
        // cells is expected.
        let report_rejects = input.pressed;

        let Some(cell) = pick_cell(world, scene, input.position) else {
            if report_rejects {
                report.reject(RejectReason::NoTarget, None);
            }
            return Ok(());
        };

        if !can_place(world, &kind.footprint, cell) {
            if report_rejects {
                report.reject(RejectReason::InvalidPlacement, Some(cell));
            }
            return Ok(());
        }

        let entity = place_checked(world, kind, cell)?;
        report.push(InteractionEvent::Spawned {
            entity,
            kind: kind.id,
            cell,
        });
        Ok(())
    }

    fn drag_update(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        kind: &DeployableType,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        if input.pressed {
            self.pointer_down = true;
            self.last_visited = None;
        }

        if self.pointer_down && input.is_down() {
            if let Some(cell) = pick_cell(world, scene, input.position) {
                tracing::trace!(%cell, "drag placement visiting cell");
                self.last_visited = Some(cell);
            }
        }

        if input.released {
            let armed = self.pointer_down;
            self.pointer_down = false;
            match self.last_visited.take() {
                Some(cell) => self.commit_drag(world, kind, cell, report)?,
                None if armed => report.reject(RejectReason::NoTarget, None),
                None => {}
            }
        }
        Ok(())
    }

    fn commit_drag(
        &mut self,
        world: &mut World,
        kind: &DeployableType,
        cell: CellIndex,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        let entity = if self.validate_on_release {
            if !can_place(world, &kind.footprint, cell) {
                report.reject(RejectReason::InvalidPlacement, Some(cell));
                return Ok(());
            }
            place_checked(world, kind, cell)?
        } else {
            let entity = spawn_at(world, kind, cell);
            let claimed = world
                .resource_mut::<OccupancyGrid>()
                .occupy_available(entity, &kind.footprint, cell);
            if claimed.len() != kind.footprint.occupied_count() {
                tracing::warn!(
                    ?entity,
                    %cell,
                    claimed = claimed.len(),
                    footprint = kind.footprint.occupied_count(),
                    "drag release committed without a full fit"
                );
            }
            tracing::debug!(?entity, kind = kind.display_name.as_str(), %cell, "deployable dropped");
            entity
        };

        report.push(InteractionEvent::Spawned {
            entity,
            kind: kind.id,
            cell,
        });
        Ok(())
    }
}
