//! Public API for the arena editor.
//!
//! This module provides the main interface for a host (renderer, toolbar,
//! property panel) to drive the editor.
//!
//! ## One Tick
//!
//! The host calls `update(input)` once per frame with the pointer edges it
//! saw that frame. Mode changes requested through `select_mode` take effect
//! at the start of the next `update`, before any pointer handling. In play
//! mode the play schedule runs after the controller.

use bevy_ecs::prelude::*;

use crate::catalog::DeployableCatalog;
use crate::components::*;
use crate::config::ArenaConfig;
use crate::controller::{InteractionController, TickReport};
use crate::error::{ArenaError, ArenaResult};
use crate::grid::{CellIndex, OccupancyGrid};
use crate::input::{EditorMode, PointerInput};
use crate::properties::{DeployableProperties, PropertyEntry, PropertyRegistry, PropertyValue};
use crate::scene::{PlanarSceneQuery, SceneQuery};
use crate::systems::placement::{can_place, deployable_type, place_checked};
use crate::systems::{play_tick_system, EditorTick};
use crate::world::Snapshot;

/// Inspection view of one deployable.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployableState {
    pub kind: DeployableKindId,
    pub display_name: String,
    pub method: DeploymentMethod,
    /// `None` while grabbed in edit mode.
    pub anchor: Option<CellIndex>,
    pub position: Position,
    pub occupied_cells: Vec<CellIndex>,
    pub grabbed: bool,
}

/// The arena editor container.
///
/// Owns the ECS world, the play schedule, the interaction controller and the
/// scene query, providing a clean API for:
/// - Stepping the editor one tick
/// - Selecting modes and palette entries
/// - Inspecting and editing deployables
pub struct ArenaWorld {
    world: World,
    play_schedule: Schedule,
    controller: InteractionController,
    scene: Box<dyn SceneQuery>,
    requested_mode: EditorMode,
    tick: u64,
}

impl ArenaWorld {
    /// Default 8x8 arena with the built-in palette.
    pub fn new() -> Self {
        let config = ArenaConfig::default();
        let world = Self::build_world(config.clone(), DeployableCatalog::arena_defaults());
        Self::from_parts(world, &config)
    }

    /// Create an arena from a custom configuration and catalog.
    pub fn with_config(config: ArenaConfig, catalog: DeployableCatalog) -> ArenaResult<Self> {
        config.validate()?;
        let world = Self::build_world(config.clone(), catalog);
        Ok(Self::from_parts(world, &config))
    }

    fn build_world(config: ArenaConfig, catalog: DeployableCatalog) -> World {
        let mut world = World::new();
        world.insert_resource(config.build_grid());
        world.insert_resource(catalog);
        world.insert_resource(PropertyRegistry::deployable());
        world.insert_resource(EditorTick(0));
        world.insert_resource(config);
        world
    }

    fn from_parts(world: World, config: &ArenaConfig) -> Self {
        let mut play_schedule = Schedule::default();
        play_schedule.add_systems(play_tick_system);

        tracing::debug!(
            columns = config.columns,
            rows = config.rows,
            validate_on_release = config.validate_on_release,
            "arena created"
        );

        Self {
            world,
            play_schedule,
            controller: InteractionController::new(config.initial_mode, config.validate_on_release),
            scene: Box::new(PlanarSceneQuery),
            requested_mode: config.initial_mode,
            tick: 0,
        }
    }

    /// Replace the spatial query collaborator.
    pub fn with_scene_query(mut self, scene: impl SceneQuery + 'static) -> Self {
        self.scene = Box::new(scene);
        self
    }

    /// Run one editor tick.
    ///
    /// Returns `Err` only for occupancy contract violations and similar caller
    /// bugs; rejected placements are reported in the `TickReport`.
    pub fn update(&mut self, input: PointerInput) -> ArenaResult<TickReport> {
        self.tick += 1;
        self.world.resource_mut::<EditorTick>().increment();

        let mut report = TickReport::new(self.tick, self.controller.mode());
        self.controller.update(
            &mut self.world,
            self.scene.as_ref(),
            &input,
            self.requested_mode,
            &mut report,
        )?;

        if self.controller.mode() == EditorMode::Play {
            self.play_schedule.run(&mut self.world);
        }
        Ok(report)
    }

    /// Request a mode change; applied at the start of the next `update`.
    pub fn select_mode(&mut self, mode: EditorMode) {
        self.requested_mode = mode;
    }

    /// Mode the controller is currently in.
    pub fn mode(&self) -> EditorMode {
        self.controller.mode()
    }

    /// Set the type spawned in create mode.
    pub fn select_deployable(&mut self, kind: DeployableKindId) -> ArenaResult<()> {
        self.world.resource::<DeployableCatalog>().require(kind)?;
        self.controller.set_candidate(Some(kind));
        Ok(())
    }

    /// Palette button pressed: select `kind`, and for drag types already in
    /// create mode, start the pending placement without a grid press.
    pub fn begin_palette_drag(&mut self, kind: DeployableKindId) -> ArenaResult<()> {
        self.select_deployable(kind)?;
        if deployable_type(&self.world, kind)?.method == DeploymentMethod::Drag {
            self.controller.arm_pointer();
        }
        Ok(())
    }

    pub fn candidate(&self) -> Option<DeployableKindId> {
        self.controller.candidate()
    }

    /// Place `kind` at `cell` outside of pointer handling.
    ///
    /// Returns `None` when the cell is occupied, the footprint does not fit,
    /// or it would cover cells a grabbed deployable must return to.
    pub fn spawn_deployable(&mut self, kind: DeployableKindId, cell: CellIndex) -> ArenaResult<Option<Entity>> {
        let kind = deployable_type(&self.world, kind)?;
        if !can_place(&self.world, &kind.footprint, cell) {
            return Ok(None);
        }
        if let Some(grab) = self.controller.grab() {
            if kind.footprint.translate(cell).any(|c| grab.released.contains(&c)) {
                tracing::debug!(%cell, entity = ?grab.entity, "spawn refused over a grabbed deployable's cells");
                return Ok(None);
            }
        }
        place_checked(&mut self.world, &kind, cell).map(Some)
    }

    /// Inspection view of a live deployable.
    pub fn deployable_state(&self, entity: Entity) -> Option<DeployableState> {
        let deployable = self.world.get::<Deployable>(entity)?;
        let anchor = self.world.get::<AnchorCell>(entity)?.0;
        let position = *self.world.get::<Position>(entity)?;
        let props = self.world.get::<DeployableProperties>(entity)?;
        let grabbed = self.controller.grab().is_some_and(|g| g.entity == entity);

        Some(DeployableState {
            kind: deployable.kind,
            display_name: props.display_name.clone(),
            method: deployable.method,
            anchor,
            position,
            occupied_cells: self.grid().occupied_cells(entity).collect(),
            grabbed,
        })
    }

    /// All live deployables, in spawn order.
    pub fn deployables(&mut self) -> Vec<Entity> {
        let mut query = self.world.query_filtered::<Entity, With<Deployable>>();
        let mut entities: Vec<Entity> = query.iter(&self.world).collect();
        entities.sort();
        entities
    }

    pub fn deployable_count(&mut self) -> usize {
        let mut query = self.world.query::<&Deployable>();
        query.iter(&self.world).count()
    }

    /// Property panel contents for `entity`.
    pub fn properties(&self, entity: Entity) -> ArenaResult<Vec<PropertyEntry>> {
        let props = self
            .world
            .get::<DeployableProperties>(entity)
            .ok_or(ArenaError::EntityNotFound(entity))?;
        Ok(self.world.resource::<PropertyRegistry>().read_all(props))
    }

    /// Called by the property panel after the user edits a field.
    pub fn on_property_changed(&mut self, entity: Entity, name: &str, value: PropertyValue) -> ArenaResult<()> {
        self.world.resource_scope(|world, registry: Mut<PropertyRegistry>| -> ArenaResult<()> {
            let mut props = world
                .get_mut::<DeployableProperties>(entity)
                .ok_or(ArenaError::EntityNotFound(entity))?;
            registry.write(&mut props, name, value)?;
            tracing::debug!(?entity, name, "property changed");
            Ok(())
        })
    }

    pub fn grid(&self) -> &OccupancyGrid {
        self.world.resource::<OccupancyGrid>()
    }

    pub fn catalog(&self) -> &DeployableCatalog {
        self.world.resource::<DeployableCatalog>()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Get a snapshot of the current arena state.
    pub fn snapshot(&mut self) -> Snapshot {
        let mode = self.controller.mode();
        Snapshot::from_world(&mut self.world, self.tick, mode)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> ArenaResult<String> {
        Ok(self.snapshot().to_json()?)
    }

    /// Check occupancy against the live deployables.
    ///
    /// Every occupied cell must name a live, placed deployable whose footprint
    /// at its anchor covers that cell. A grabbed deployable owns no cells, and
    /// only the grabbed deployable may be unanchored.
    pub fn verify_invariants(&self) -> ArenaResult<()> {
        let grabbed = self.controller.grab().map(|g| g.entity);
        for entity in self.world.iter_entities() {
            if !entity.contains::<Deployable>() || Some(entity.id()) == grabbed {
                continue;
            }
            if entity.get::<AnchorCell>().is_some_and(|a| !a.is_placed()) {
                return Err(ArenaError::InvariantViolated(format!(
                    "{:?} is neither grabbed nor anchored",
                    entity.id()
                )));
            }
        }

        let grid = self.grid();
        for cell in grid.cells() {
            let Some(occupant) = cell.occupant() else {
                continue;
            };
            let deployable = self.world.get::<Deployable>(occupant).ok_or_else(|| {
                ArenaError::InvariantViolated(format!("cell {} names dead entity {occupant:?}", cell.index))
            })?;
            let anchor = self.world.get::<AnchorCell>(occupant).and_then(|a| a.0).ok_or_else(|| {
                ArenaError::InvariantViolated(format!("cell {} owned by unplaced {occupant:?}", cell.index))
            })?;
            if !deployable.footprint.translate(anchor).any(|c| c == cell.index) {
                return Err(ArenaError::InvariantViolated(format!(
                    "cell {} outside the footprint of {occupant:?} at {anchor}",
                    cell.index
                )));
            }
        }
        Ok(())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}

impl Default for ArenaWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{InteractionEvent, RejectReason};
    use crate::footprint::Footprint;
    use crate::grid::CellState;

    fn kind(arena: &ArenaWorld, name: &str) -> DeployableKindId {
        arena.catalog().find_by_name(name).unwrap().id
    }

    fn center(arena: &ArenaWorld, col: i32, row: i32) -> Position {
        arena.grid().cell_center(CellIndex::new(col, row))
    }

    fn create_mode(arena: &mut ArenaWorld, name: &str) {
        let kind = kind(arena, name);
        arena.select_deployable(kind).unwrap();
        arena.select_mode(EditorMode::Create);
        arena.update(PointerInput::idle(Position::default())).unwrap();
    }

    fn occupancy(arena: &ArenaWorld) -> Vec<Option<Entity>> {
        arena.grid().cells().map(|c| c.occupant()).collect()
    }

    #[test]
    fn test_starts_in_edit_mode() {
        let arena = ArenaWorld::new();
        assert_eq!(arena.mode(), EditorMode::Edit);
        assert_eq!(arena.grid().columns(), 8);
        assert_eq!(arena.grid().occupied_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ArenaConfig {
            rows: 0,
            ..Default::default()
        };
        let result = ArenaWorld::with_config(config, DeployableCatalog::arena_defaults());
        assert!(matches!(result, Err(ArenaError::InvalidConfig(_))));
    }

    #[test]
    fn test_brush_place() {
        let mut arena = ArenaWorld::new();
        create_mode(&mut arena, "Crate");

        let pos = center(&arena, 3, 3);
        let report = arena.update(PointerInput::click(pos)).unwrap();

        let spawned: Vec<Entity> = report.spawned().collect();
        assert_eq!(spawned.len(), 1);
        let cell = arena.grid().cell(CellIndex::new(3, 3)).unwrap();
        assert_eq!(cell.occupant(), Some(spawned[0]));
        assert!(!cell.is_empty());
        assert_eq!(arena.deployable_state(spawned[0]).unwrap().position, pos);
    }

    #[test]
    fn test_brush_paints_while_held() {
        let mut arena = ArenaWorld::new();
        create_mode(&mut arena, "Crate");

        arena.update(PointerInput::press(center(&arena, 0, 0))).unwrap();
        arena.update(PointerInput::hold(center(&arena, 1, 0))).unwrap();
        // Back over an occupied cell: silent.
        let report = arena.update(PointerInput::hold(center(&arena, 0, 0))).unwrap();
        assert!(report.is_empty());
        arena.update(PointerInput::release(center(&arena, 2, 0))).unwrap();

        assert_eq!(arena.deployable_count(), 2);
        assert!(arena.grid().cell_at(2, 0).unwrap().is_empty());
        arena.verify_invariants().unwrap();
    }

    #[test]
    fn test_brush_press_on_occupied_is_rejected() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        arena.spawn_deployable(crate_kind, CellIndex::new(3, 3)).unwrap();
        create_mode(&mut arena, "Crate");

        let report = arena.update(PointerInput::click(center(&arena, 3, 3))).unwrap();
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::InvalidPlacement]);
        assert_eq!(arena.deployable_count(), 1);
    }

    #[test]
    fn test_legacy_drag_release_out_of_bounds() {
        let mut arena = ArenaWorld::new();
        create_mode(&mut arena, "Turret");

        let report = arena.update(PointerInput::click(center(&arena, 7, 3))).unwrap();

        let spawned: Vec<Entity> = report.spawned().collect();
        assert_eq!(spawned.len(), 1);
        let mut claimed: Vec<CellIndex> = arena.grid().occupied_cells(spawned[0]).collect();
        claimed.sort();
        assert_eq!(claimed, vec![CellIndex::new(7, 3), CellIndex::new(7, 4)]);
        assert_eq!(arena.grid().occupied_count(), 2);
        assert_eq!(arena.grid().cells().count(), 64);
    }

    #[test]
    fn test_validated_drag_release_out_of_bounds() {
        let config = ArenaConfig {
            validate_on_release: true,
            ..Default::default()
        };
        let mut arena = ArenaWorld::with_config(config, DeployableCatalog::arena_defaults()).unwrap();
        create_mode(&mut arena, "Turret");

        let report = arena.update(PointerInput::click(center(&arena, 7, 3))).unwrap();

        assert_eq!(report.spawned().count(), 0);
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::InvalidPlacement]);
        assert_eq!(arena.deployable_count(), 0);
        assert_eq!(arena.grid().occupied_count(), 0);
    }

    #[test]
    fn test_drag_commits_at_last_visited_cell() {
        let mut arena = ArenaWorld::new();
        create_mode(&mut arena, "Turret");

        arena.update(PointerInput::press(center(&arena, 0, 0))).unwrap();
        arena.update(PointerInput::hold(center(&arena, 2, 2))).unwrap();
        assert_eq!(arena.controller().last_visited(), Some(CellIndex::new(2, 2)));
        assert_eq!(arena.deployable_count(), 0);

        let report = arena.update(PointerInput::release(center(&arena, 5, 5))).unwrap();
        let entity = report.spawned().next().unwrap();
        assert_eq!(arena.deployable_state(entity).unwrap().anchor, Some(CellIndex::new(2, 2)));
        assert_eq!(arena.grid().occupied_count(), 4);
    }

    #[test]
    fn test_palette_drag() {
        let mut arena = ArenaWorld::new();
        arena.select_mode(EditorMode::Create);
        arena.update(PointerInput::idle(Position::default())).unwrap();

        let turret = kind(&arena, "Turret");
        arena.begin_palette_drag(turret).unwrap();
        assert!(arena.controller().is_pointer_down());

        arena.update(PointerInput::hold(center(&arena, 4, 1))).unwrap();
        let report = arena.update(PointerInput::release(center(&arena, 4, 1))).unwrap();

        let entity = report.spawned().next().unwrap();
        assert_eq!(arena.deployable_state(entity).unwrap().anchor, Some(CellIndex::new(4, 1)));
    }

    #[test]
    fn test_select_unknown_kind() {
        let mut arena = ArenaWorld::new();
        let result = arena.select_deployable(DeployableKindId(99));
        assert!(matches!(result, Err(ArenaError::UnknownKind(_))));
        assert_eq!(arena.candidate(), None);
    }

    #[test]
    fn test_edit_revert_restores_state() {
        let mut arena = ArenaWorld::new();
        let turret = kind(&arena, "Turret");
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(turret, CellIndex::new(2, 2)).unwrap().unwrap();
        let blocker = arena.spawn_deployable(crate_kind, CellIndex::new(4, 4)).unwrap().unwrap();

        let before_pos = arena.deployable_state(entity).unwrap().position;
        let before_grid = occupancy(&arena);

        let grab_at = before_pos;
        let report = arena.update(PointerInput::press(grab_at)).unwrap();
        assert!(matches!(report.events[0], InteractionEvent::Grabbed { .. }));
        assert!(arena.deployable_state(entity).unwrap().grabbed);
        assert_eq!(arena.grid().occupied_count(), 1);

        arena.update(PointerInput::hold(center(&arena, 4, 4))).unwrap();
        let report = arena.update(PointerInput::release(center(&arena, 4, 4))).unwrap();
        assert!(report
            .events
            .contains(&InteractionEvent::Reverted { entity, cell: CellIndex::new(2, 2) }));

        let after = arena.deployable_state(entity).unwrap();
        assert_eq!(after.position.x.to_bits(), before_pos.x.to_bits());
        assert_eq!(after.position.y.to_bits(), before_pos.y.to_bits());
        assert_eq!(after.anchor, Some(CellIndex::new(2, 2)));
        assert_eq!(occupancy(&arena), before_grid);
        assert_eq!(arena.grid().occupant_at(CellIndex::new(4, 4)), Some(blocker));
        arena.verify_invariants().unwrap();
    }

    #[test]
    fn test_edit_move() {
        let mut arena = ArenaWorld::new();
        let turret = kind(&arena, "Turret");
        let entity = arena.spawn_deployable(turret, CellIndex::new(2, 2)).unwrap().unwrap();
        let grab_at = arena.deployable_state(entity).unwrap().position;

        arena.update(PointerInput::press(grab_at)).unwrap();
        // Overlapping its own old footprint is fine.
        arena.update(PointerInput::hold(center(&arena, 3, 2))).unwrap();
        let report = arena.update(PointerInput::release(center(&arena, 3, 2))).unwrap();

        assert!(report.events.contains(&InteractionEvent::Moved {
            entity,
            from: CellIndex::new(2, 2),
            to: CellIndex::new(3, 2),
        }));
        let mut cells = arena.deployable_state(entity).unwrap().occupied_cells;
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellIndex::new(3, 2),
                CellIndex::new(3, 3),
                CellIndex::new(4, 2),
                CellIndex::new(4, 3),
            ]
        );
        arena.verify_invariants().unwrap();
    }

    #[test]
    fn test_edit_press_on_nothing() {
        let mut arena = ArenaWorld::new();
        let report = arena.update(PointerInput::click(center(&arena, 5, 5))).unwrap();
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::NoTarget]);
        assert!(arena.controller().grab().is_none());
    }

    #[test]
    fn test_mode_change_reverts_grab() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(crate_kind, CellIndex::new(1, 1)).unwrap().unwrap();
        let before = occupancy(&arena);

        arena.update(PointerInput::press(center(&arena, 1, 1))).unwrap();
        arena.update(PointerInput::hold(center(&arena, 6, 6))).unwrap();

        arena.select_mode(EditorMode::Erase);
        let report = arena.update(PointerInput::idle(center(&arena, 6, 6))).unwrap();

        assert_eq!(report.mode, EditorMode::Erase);
        assert!(report
            .events
            .contains(&InteractionEvent::Reverted { entity, cell: CellIndex::new(1, 1) }));
        assert_eq!(occupancy(&arena), before);
        assert_eq!(arena.deployable_state(entity).unwrap().position, center(&arena, 1, 1));
    }

    #[test]
    fn test_erase_sweep_destroys_once() {
        let mut catalog = DeployableCatalog::new();
        let pillar = catalog.register(
            "Pillar",
            DeploymentMethod::Brush,
            Footprint::from_rows(&["#", "#"]).unwrap(),
        );
        let mut arena = ArenaWorld::with_config(ArenaConfig::default(), catalog).unwrap();
        let entity = arena.spawn_deployable(pillar, CellIndex::new(1, 1)).unwrap().unwrap();
        assert_eq!(arena.grid().occupant_at(CellIndex::new(1, 2)), Some(entity));

        arena.select_mode(EditorMode::Erase);
        let mut erased = Vec::new();
        for input in [
            PointerInput::press(center(&arena, 1, 1)),
            PointerInput::hold(center(&arena, 1, 2)),
            PointerInput::release(center(&arena, 1, 2)),
        ] {
            erased.extend(arena.update(input).unwrap().erased());
        }

        assert_eq!(erased, vec![entity]);
        assert_eq!(arena.deployable_count(), 0);
        assert!(arena.grid().cell_at(1, 1).unwrap().is_empty());
        assert!(arena.grid().cell_at(1, 2).unwrap().is_empty());
    }

    #[test]
    fn test_erase_is_idempotent() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        arena.spawn_deployable(crate_kind, CellIndex::new(0, 0)).unwrap();
        arena.select_mode(EditorMode::Erase);
        let before = occupancy(&arena);

        for _ in 0..2 {
            let report = arena.update(PointerInput::click(center(&arena, 5, 5))).unwrap();
            assert_eq!(report.erased().count(), 0);
        }
        assert_eq!(occupancy(&arena), before);
        assert_eq!(arena.deployable_count(), 1);
    }

    #[test]
    fn test_fit_symmetry() {
        let mut arena = ArenaWorld::new();
        let bunker = arena.catalog().find_by_name("Bunker").unwrap().footprint.clone();
        let probes: Vec<CellIndex> = (0..8).flat_map(|r| (0..8).map(move |c| CellIndex::new(c, r))).collect();
        let before: Vec<bool> = probes.iter().map(|&c| arena.grid().is_placeable(&bunker, c)).collect();

        // Far corner; no 3x3 probe anchored in the first five columns and rows reaches it.
        let crate_kind = kind(&arena, "Crate");
        arena.spawn_deployable(crate_kind, CellIndex::new(7, 7)).unwrap().unwrap();

        for (i, &cell) in probes.iter().enumerate() {
            if cell.col < 5 && cell.row < 5 {
                assert_eq!(arena.grid().is_placeable(&bunker, cell), before[i], "{cell}");
            }
        }
    }

    #[test]
    fn test_disjoint_after_mixed_session() {
        let config = ArenaConfig {
            validate_on_release: true,
            ..Default::default()
        };
        let mut arena = ArenaWorld::with_config(config, DeployableCatalog::arena_defaults()).unwrap();

        create_mode(&mut arena, "Crate");
        for col in 0..8 {
            arena.update(PointerInput::click(center(&arena, col, 0))).unwrap();
        }
        let turret = kind(&arena, "Turret");
        arena.select_deployable(turret).unwrap();
        for (col, row) in [(0, 0), (1, 1), (2, 1), (4, 4), (5, 5)] {
            arena.update(PointerInput::click(center(&arena, col, row))).unwrap();
        }
        arena.verify_invariants().unwrap();

        // 8 crates, turrets at (1,1) and (4,4).
        assert_eq!(arena.deployable_count(), 10);
        assert_eq!(arena.grid().occupied_count(), 16);
    }

    #[test]
    fn test_spawn_rejects_overlap() {
        let mut arena = ArenaWorld::new();
        let bunker = kind(&arena, "Bunker");
        assert!(arena.spawn_deployable(bunker, CellIndex::new(0, 0)).unwrap().is_some());
        assert!(arena.spawn_deployable(bunker, CellIndex::new(2, 2)).unwrap().is_none());
        assert!(arena.spawn_deployable(bunker, CellIndex::new(6, 6)).unwrap().is_none());
        assert_eq!(arena.deployable_count(), 1);
    }

    #[test]
    fn test_contract_violation_is_fatal() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let a = arena.spawn_deployable(crate_kind, CellIndex::new(0, 0)).unwrap().unwrap();
        let b = arena.spawn_deployable(crate_kind, CellIndex::new(1, 0)).unwrap().unwrap();

        let single = Footprint::single();
        let result = arena
            .world_mut()
            .resource_mut::<OccupancyGrid>()
            .set_occupancy(b, &single, CellIndex::new(0, 0), CellState::Full);
        assert!(result.is_err());
        assert_eq!(arena.grid().occupant_at(CellIndex::new(0, 0)), Some(a));
    }

    #[test]
    fn test_verify_detects_dangling_occupant() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(crate_kind, CellIndex::new(0, 0)).unwrap().unwrap();
        arena.world_mut().despawn(entity);

        assert!(matches!(arena.verify_invariants(), Err(ArenaError::InvariantViolated(_))));
    }

    #[test]
    fn test_property_edits() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(crate_kind, CellIndex::new(0, 0)).unwrap().unwrap();

        arena
            .on_property_changed(entity, "Display Name", PropertyValue::Text("Supply".into()))
            .unwrap();
        arena
            .on_property_changed(entity, "Custom Int", PropertyValue::Int(7))
            .unwrap();

        assert_eq!(arena.deployable_state(entity).unwrap().display_name, "Supply");
        let props = arena.properties(entity).unwrap();
        assert!(props
            .iter()
            .any(|p| p.name == "Custom Int" && p.value == PropertyValue::Int(7)));

        let err = arena.on_property_changed(entity, "Custom Int", PropertyValue::Bool(true));
        assert!(matches!(err, Err(ArenaError::Property(_))));
        let err = arena.on_property_changed(entity, "Nope", PropertyValue::Bool(true));
        assert!(matches!(err, Err(ArenaError::Property(_))));
    }

    #[test]
    fn test_play_mode_ticks_active_deployables() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let on = arena.spawn_deployable(crate_kind, CellIndex::new(0, 0)).unwrap().unwrap();
        let off = arena.spawn_deployable(crate_kind, CellIndex::new(1, 0)).unwrap().unwrap();
        arena
            .on_property_changed(off, "Active", PropertyValue::Bool(false))
            .unwrap();

        arena.update(PointerInput::idle(Position::default())).unwrap();
        arena.select_mode(EditorMode::Play);
        arena.update(PointerInput::idle(Position::default())).unwrap();
        // Pointer input does nothing in play mode.
        let report = arena.update(PointerInput::click(center(&arena, 5, 5))).unwrap();
        assert!(report.is_empty());

        assert_eq!(arena.world().get::<PlayTicks>(on).unwrap().0, 2);
        assert_eq!(arena.world().get::<PlayTicks>(off).unwrap().0, 0);
        assert_eq!(arena.world().resource::<EditorTick>().0, 3);
    }

    #[test]
    fn test_snapshot_json() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        arena.spawn_deployable(crate_kind, CellIndex::new(2, 3)).unwrap();
        arena.update(PointerInput::idle(Position::default())).unwrap();

        let json = arena.snapshot_json().unwrap();
        let snapshot = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.mode, "Edit");
        assert_eq!(snapshot.deployables.len(), 1);
        assert_eq!(snapshot.deployables[0].anchor, Some((2, 3)));
    }

    #[test]
    fn test_spawn_refused_over_grabbed_cells() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(crate_kind, CellIndex::new(2, 2)).unwrap().unwrap();

        arena.update(PointerInput::press(center(&arena, 2, 2))).unwrap();
        arena.update(PointerInput::hold(center(&arena, 6, 6))).unwrap();
        assert!(arena.deployable_state(entity).unwrap().grabbed);

        assert_eq!(arena.spawn_deployable(crate_kind, CellIndex::new(2, 2)).unwrap(), None);
        assert!(arena.spawn_deployable(crate_kind, CellIndex::new(5, 5)).unwrap().is_some());

        // Dropped off the grid: back to its cell.
        let report = arena.update(PointerInput::release(Position::new(-3.0, 3.0))).unwrap();
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::NoTarget]);
        assert_eq!(arena.deployable_state(entity).unwrap().anchor, Some(CellIndex::new(2, 2)));
        arena.verify_invariants().unwrap();
    }

    #[test]
    fn test_failed_revert_keeps_grab() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(crate_kind, CellIndex::new(2, 2)).unwrap().unwrap();
        arena.update(PointerInput::press(center(&arena, 2, 2))).unwrap();

        // Something outside the controller takes the released cell.
        let intruder = arena.world_mut().spawn_empty().id();
        let single = Footprint::single();
        arena
            .world_mut()
            .resource_mut::<OccupancyGrid>()
            .set_occupancy(intruder, &single, CellIndex::new(2, 2), CellState::Full)
            .unwrap();

        let result = arena.update(PointerInput::release(Position::new(-3.0, 3.0)));
        assert!(matches!(result, Err(ArenaError::Occupancy(_))));
        assert_eq!(arena.controller().grab().map(|g| g.entity), Some(entity));
        assert!(arena.deployable_state(entity).unwrap().grabbed);

        arena
            .world_mut()
            .resource_mut::<OccupancyGrid>()
            .set_occupancy(intruder, &single, CellIndex::new(2, 2), CellState::Empty)
            .unwrap();
        arena.world_mut().despawn(intruder);

        arena.select_mode(EditorMode::Erase);
        let report = arena.update(PointerInput::idle(Position::default())).unwrap();
        assert!(report
            .events
            .contains(&InteractionEvent::Reverted { entity, cell: CellIndex::new(2, 2) }));
        assert_eq!(arena.grid().occupant_at(CellIndex::new(2, 2)), Some(entity));
        arena.verify_invariants().unwrap();
    }

    #[test]
    fn test_verify_detects_stranded_deployable() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        let entity = arena.spawn_deployable(crate_kind, CellIndex::new(3, 3)).unwrap().unwrap();

        let single = Footprint::single();
        arena
            .world_mut()
            .resource_mut::<OccupancyGrid>()
            .set_occupancy(entity, &single, CellIndex::new(3, 3), CellState::Empty)
            .unwrap();
        arena.world_mut().get_mut::<AnchorCell>(entity).unwrap().0 = None;

        assert!(matches!(arena.verify_invariants(), Err(ArenaError::InvariantViolated(_))));
    }

    #[test]
    fn test_erase_reaches_deployable_without_cells() {
        let mut arena = ArenaWorld::new();
        let turret = kind(&arena, "Turret");
        let first = arena.spawn_deployable(turret, CellIndex::new(2, 2)).unwrap().unwrap();

        // Unvalidated drop right on top of it claims nothing.
        create_mode(&mut arena, "Turret");
        let report = arena.update(PointerInput::click(center(&arena, 2, 2))).unwrap();
        let second = report.spawned().next().unwrap();
        assert!(arena.deployable_state(second).unwrap().occupied_cells.is_empty());

        arena.select_mode(EditorMode::Erase);
        let mut erased = Vec::new();
        erased.extend(arena.update(PointerInput::press(center(&arena, 0, 0))).unwrap().erased());
        for row in 0..8 {
            for col in 0..8 {
                erased.extend(arena.update(PointerInput::hold(center(&arena, col, row))).unwrap().erased());
            }
        }
        arena.update(PointerInput::release(center(&arena, 7, 7))).unwrap();

        assert_eq!(erased, vec![first, second]);
        assert_eq!(arena.deployable_count(), 0);
        assert_eq!(arena.grid().occupied_count(), 0);
    }

    #[test]
    fn test_drag_release_never_over_grid() {
        let mut arena = ArenaWorld::new();
        let crate_kind = kind(&arena, "Crate");
        arena.spawn_deployable(crate_kind, CellIndex::new(0, 0)).unwrap();
        create_mode(&mut arena, "Turret");
        let before = occupancy(&arena);

        arena.update(PointerInput::press(Position::new(-5.0, 5.0))).unwrap();
        arena.update(PointerInput::hold(Position::new(-3.0, 2.0))).unwrap();
        let report = arena.update(PointerInput::release(Position::new(-3.0, 2.0))).unwrap();

        assert_eq!(report.spawned().count(), 0);
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::NoTarget]);
        assert_eq!(arena.deployable_count(), 1);
        assert_eq!(occupancy(&arena), before);
        assert_eq!(arena.controller().last_visited(), None);
    }

    #[test]
    fn test_validated_drag_release_over_occupied() {
        let config = ArenaConfig {
            validate_on_release: true,
            ..Default::default()
        };
        let mut arena = ArenaWorld::with_config(config, DeployableCatalog::arena_defaults()).unwrap();
        let crate_kind = kind(&arena, "Crate");
        let blocker = arena.spawn_deployable(crate_kind, CellIndex::new(4, 4)).unwrap().unwrap();
        create_mode(&mut arena, "Turret");
        let before = occupancy(&arena);

        // Anchor free, footprint overlaps the crate.
        arena.update(PointerInput::press(center(&arena, 1, 1))).unwrap();
        arena.update(PointerInput::hold(center(&arena, 3, 3))).unwrap();
        let report = arena.update(PointerInput::release(center(&arena, 3, 3))).unwrap();
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::InvalidPlacement]);

        // Anchor itself occupied.
        let report = arena.update(PointerInput::click(center(&arena, 4, 4))).unwrap();
        assert_eq!(report.rejections().collect::<Vec<_>>(), vec![RejectReason::InvalidPlacement]);

        assert_eq!(arena.deployable_count(), 1);
        assert_eq!(occupancy(&arena), before);
        assert_eq!(arena.grid().occupant_at(CellIndex::new(4, 4)), Some(blocker));
    }
}
