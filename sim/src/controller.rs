//! Interaction controller - the editor's mode state machine.
//!
//! One `update` per tick. The requested toolbar mode is applied first, then
//! the current mode's pointer handler runs against the press / drag-sample /
//! release events of that tick. The handlers live in `crate::systems`.
//!
//! The controller is the only writer of `OccupancyGrid` and the only place
//! deployables are spawned or despawned during interaction.

use bevy_ecs::prelude::*;
use serde::Serialize;

use crate::components::DeployableKindId;
use crate::error::ArenaResult;
use crate::grid::CellIndex;
use crate::input::{EditorMode, PointerInput};
use crate::scene::SceneQuery;

/// Why a placement step did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Target cell occupied, or the footprint leaves the grid.
    InvalidPlacement,
    /// Nothing valid under the pointer.
    NoTarget,
}

/// Something the controller did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    ModeChanged { from: EditorMode, to: EditorMode },
    Spawned { entity: Entity, kind: DeployableKindId, cell: CellIndex },
    Grabbed { entity: Entity, from: CellIndex },
    Moved { entity: Entity, from: CellIndex, to: CellIndex },
    Reverted { entity: Entity, cell: CellIndex },
    Erased { entity: Entity, cell: CellIndex },
    Rejected { reason: RejectReason, cell: Option<CellIndex> },
}

/// Outcome of one controller tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Mode the tick ran in.
    pub mode: EditorMode,
    pub events: Vec<InteractionEvent>,
}

impl TickReport {
    pub fn new(tick: u64, mode: EditorMode) -> Self {
        Self {
            tick,
            mode,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, event: InteractionEvent) {
        self.events.push(event);
    }

    pub(crate) fn reject(&mut self, reason: RejectReason, cell: Option<CellIndex>) {
        tracing::trace!(?reason, ?cell, "placement step rejected");
        self.events.push(InteractionEvent::Rejected { reason, cell });
    }

    /// Entities spawned this tick.
    pub fn spawned(&self) -> impl Iterator<Item = Entity> + '_ {
        self.events.iter().filter_map(|e| match e {
            InteractionEvent::Spawned { entity, .. } => Some(*entity),
            _ => None,
        })
    }

    /// Entities erased this tick.
    pub fn erased(&self) -> impl Iterator<Item = Entity> + '_ {
        self.events.iter().filter_map(|e| match e {
            InteractionEvent::Erased { entity, .. } => Some(*entity),
            _ => None,
        })
    }

    pub fn rejections(&self) -> impl Iterator<Item = RejectReason> + '_ {
        self.events.iter().filter_map(|e| match e {
            InteractionEvent::Rejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// An entity lifted off the grid in edit mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Grab {
    pub entity: Entity,
    /// Anchor before the grab; the revert target.
    pub origin: CellIndex,
    /// Exactly the cells released at grab time.
    pub released: Vec<CellIndex>,
    /// Entity position minus pointer position at grab time.
    pub offset: (f32, f32),
}

/// Mode state machine plus the per-gesture state the handlers share.
#[derive(Debug, Clone)]
pub struct InteractionController {
    pub(crate) mode: EditorMode,
    pub(crate) candidate: Option<DeployableKindId>,
    pub(crate) pointer_down: bool,
    pub(crate) last_visited: Option<CellIndex>,
    pub(crate) grab: Option<Grab>,
    pub(crate) validate_on_release: bool,
}

impl InteractionController {
    pub fn new(initial_mode: EditorMode, validate_on_release: bool) -> Self {
        Self {
            mode: initial_mode,
            candidate: None,
            pointer_down: false,
            last_visited: None,
            grab: None,
            validate_on_release,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Type spawned in create mode.
    pub fn candidate(&self) -> Option<DeployableKindId> {
        self.candidate
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Cell a pending drag placement would commit to.
    pub fn last_visited(&self) -> Option<CellIndex> {
        self.last_visited
    }

    pub fn grab(&self) -> Option<&Grab> {
        self.grab.as_ref()
    }

    pub fn validate_on_release(&self) -> bool {
        self.validate_on_release
    }

    pub fn set_validate_on_release(&mut self, validate: bool) {
        self.validate_on_release = validate;
    }

    pub(crate) fn set_candidate(&mut self, kind: Option<DeployableKindId>) {
        self.candidate = kind;
    }

    /// Arm a drag placement from the palette itself, before any grid press.
    pub(crate) fn arm_pointer(&mut self) {
        if self.mode == EditorMode::Create {
            self.pointer_down = true;
            self.last_visited = None;
        }
    }

    /// Run one tick.
    pub fn update(
        &mut self,
        world: &mut World,
        scene: &dyn SceneQuery,
        input: &PointerInput,
        requested: EditorMode,
        report: &mut TickReport,
    ) -> ArenaResult<()> {
        if requested != self.mode {
            self.change_mode(world, requested, report)?;
        }
        report.mode = self.mode;

        match self.mode {
            EditorMode::Create => self.create_update(world, scene, input, report),
            EditorMode::Edit => self.edit_update(world, scene, input, report),
            EditorMode::Erase => self.erase_update(world, scene, input, report),
            EditorMode::Play => Ok(()),
        }
    }

    fn change_mode(&mut self, world: &mut World, to: EditorMode, report: &mut TickReport) -> ArenaResult<()> {
        // A grabbed entity holds no cells; put it back before leaving edit mode.
        if self.grab.is_some() {
            self.revert_grab(world, report)?;
        }
        let from = self.mode;
        self.mode = to;
        self.pointer_down = false;
        self.last_visited = None;
        tracing::debug!(?from, ?to, "editor mode changed");
        report.push(InteractionEvent::ModeChanged { from, to });
        Ok(())
    }
}
