//! Arena Sim - Grid Placement Editor Core
//!
//! Grid-based placement, editing and removal of deployables for a level
//! editor. Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod catalog;
pub mod components;
pub mod config;
pub mod controller;
pub mod error;
pub mod footprint;
pub mod grid;
pub mod input;
pub mod properties;
pub mod scene;
pub mod systems;
pub mod world;

pub use api::{ArenaWorld, DeployableState};
pub use catalog::{CatalogEntry, DeployableCatalog, DeployableType};
pub use components::*;
pub use config::ArenaConfig;
pub use controller::{InteractionController, InteractionEvent, RejectReason, TickReport};
pub use error::{ArenaError, ArenaResult, FootprintError, OccupancyError, PropertyError};
pub use footprint::{centered_position, Footprint};
pub use grid::{CellIndex, CellState, GridCell, OccupancyGrid};
pub use input::{EditorMode, PointerInput};
pub use properties::{DeployableProperties, PropertyEntry, PropertyKind, PropertyRegistry, PropertyValue};
pub use scene::{CollisionMask, PickTarget, PlanarSceneQuery, SceneHit, SceneQuery, SceneView};
pub use systems::{play_tick_system, EditorTick};
pub use world::Snapshot;
