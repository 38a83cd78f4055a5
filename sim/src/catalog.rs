//! Deployable type catalog.
//!
//! The palette UI lists these types by display name and hands the selected
//! `DeployableKindId` to the controller. Each type owns its footprint; every
//! spawned instance shares it read-only.

use std::num::NonZeroU32;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{DeployableKindId, DeploymentMethod};
use crate::error::{ArenaError, ArenaResult};
use crate::footprint::Footprint;
use crate::properties::DeployableProperties;

/// A placeable type.
#[derive(Debug, Clone)]
pub struct DeployableType {
    pub id: DeployableKindId,
    pub display_name: String,
    pub method: DeploymentMethod,
    pub footprint: Arc<Footprint>,
}

impl DeployableType {
    /// Initial property values for a new instance.
    pub fn default_properties(&self) -> DeployableProperties {
        DeployableProperties::named(self.display_name.clone())
    }
}

/// Serialized form of a catalog entry.
///
/// ```json
/// { "display_name": "Wall", "method": "Drag", "footprint": ["###"] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub display_name: String,
    #[serde(default)]
    pub method: DeploymentMethod,
    pub footprint: Vec<String>,
}

/// All registered deployable types, indexed by `DeployableKindId`.
#[derive(Resource, Debug, Clone, Default)]
pub struct DeployableCatalog {
    types: Vec<DeployableType>,
}

impl DeployableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small built-in palette used by the demo.
    pub fn arena_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register("Crate", DeploymentMethod::Brush, Footprint::single());
        catalog.register("Turret", DeploymentMethod::Drag, Footprint::rect(TURRET_EDGE, TURRET_EDGE));
        catalog.register("Bunker", DeploymentMethod::Drag, Footprint::rect(BUNKER_EDGE, BUNKER_EDGE));
        catalog
    }

    /// Load a catalog from a JSON array of [`CatalogEntry`].
    pub fn from_json(json: &str) -> ArenaResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for entry in entries {
            let footprint = Footprint::from_rows(entry.footprint.as_slice())?;
            catalog.register(entry.display_name, entry.method, footprint);
        }
        Ok(catalog)
    }

    /// Register a new type and return its id.
    pub fn register(
        &mut self,
        display_name: impl Into<String>,
        method: DeploymentMethod,
        footprint: Footprint,
    ) -> DeployableKindId {
        let id = DeployableKindId(self.types.len() as u32);
        self.types.push(DeployableType {
            id,
            display_name: display_name.into(),
            method,
            footprint: Arc::new(footprint),
        });
        id
    }

    pub fn get(&self, id: DeployableKindId) -> Option<&DeployableType> {
        self.types.get(id.0 as usize)
    }

    pub fn require(&self, id: DeployableKindId) -> ArenaResult<&DeployableType> {
        self.get(id).ok_or(ArenaError::UnknownKind(id))
    }

    pub fn find_by_name(&self, display_name: &str) -> Option<&DeployableType> {
        self.types.iter().find(|t| t.display_name == display_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeployableType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Edge length of a built-in square footprint, checked at compile time.
const fn edge(cells: u32) -> NonZeroU32 {
    match NonZeroU32::new(cells) {
        Some(cells) => cells,
        None => panic!("footprint edge must be non-zero"),
    }
}

const TURRET_EDGE: NonZeroU32 = edge(2);
const BUNKER_EDGE: NonZeroU32 = edge(3);
