//! Error types for the arena core.
//!
//! Rejected placements and empty pointer queries are not errors: they show up
//! as `InteractionEvent::Rejected` in the tick report. Only caller bugs and
//! bad configuration surface here.

use bevy_ecs::entity::Entity;
use thiserror::Error;

use crate::components::DeployableKindId;
use crate::grid::CellIndex;
use crate::properties::PropertyKind;

/// Occupancy contract errors raised by `OccupancyGrid`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OccupancyError {
    /// A cell owned by one entity was asked to take another occupant.
    ///
    /// Callers must gate with `is_placeable` before occupying.
    #[error("occupancy contract violation at {cell}: owned by {occupant:?}, requested {requested:?}")]
    ContractViolation {
        cell: CellIndex,
        occupant: Entity,
        requested: Entity,
    },
}

/// Malformed footprint masks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FootprintError {
    /// The mask has no rows, no columns, or no occupied cell.
    #[error("footprint mask is empty")]
    Empty,

    /// Rows of the mask differ in length.
    #[error("footprint row {row} has width {found}, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    /// Unknown mask character (only `#` and `.` are allowed).
    #[error("footprint row {row} contains invalid character {found:?}")]
    InvalidChar { row: usize, found: char },
}

/// Property registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    Unknown(String),

    #[error("property {name} expects {expected:?}, got {found:?}")]
    TypeMismatch {
        name: String,
        expected: PropertyKind,
        found: PropertyKind,
    },
}

/// Top-level error for `ArenaWorld` operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),

    #[error(transparent)]
    Footprint(#[from] FootprintError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    /// No deployable type is registered under this id.
    #[error("unknown deployable kind: {0:?}")]
    UnknownKind(DeployableKindId),

    /// The entity is not a live deployable.
    #[error("entity not found: {0:?}")]
    EntityNotFound(Entity),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Grid and entity state disagree.
    #[error("occupancy invariant violated: {0}")]
    InvariantViolated(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;
