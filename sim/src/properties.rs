//! Editable per-deployable properties.
//!
//! Instead of discovering fields at runtime, every editable field is declared
//! once in a [`PropertyRegistry`] as a typed `(name, get, set)` descriptor,
//! grouped by primitive type. A property panel lists the descriptors, shows
//! their current values, and after an edit calls back into the arena, which
//! writes the new value through the matching setter.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::PropertyError;

/// Editable values carried by every deployable.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployableProperties {
    pub display_name: String,
    pub active: bool,
    pub custom_int: i32,
    pub custom_float: f32,
    pub dark_tint: bool,
}

impl DeployableProperties {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }
}

impl Default for DeployableProperties {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            active: true,
            custom_int: 0,
            custom_float: 0.0,
            dark_tint: false,
        }
    }
}

/// Primitive type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    Text,
}

/// A property value crossing the editor boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Text(String),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Text(_) => PropertyKind::Text,
        }
    }
}

/// Typed accessor pair for one field.
pub struct Property<T> {
    pub name: &'static str,
    get: fn(&DeployableProperties) -> T,
    set: fn(&mut DeployableProperties, T),
}

impl<T> Property<T> {
    pub const fn new(
        name: &'static str,
        get: fn(&DeployableProperties) -> T,
        set: fn(&mut DeployableProperties, T),
    ) -> Self {
        Self { name, get, set }
    }

    pub fn get(&self, props: &DeployableProperties) -> T {
        (self.get)(props)
    }

    pub fn set(&self, props: &mut DeployableProperties, value: T) {
        (self.set)(props, value)
    }
}

/// One row of a property panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    pub value: PropertyValue,
}

/// Editable field descriptors grouped by primitive type.
#[derive(Resource)]
pub struct PropertyRegistry {
    pub bools: Vec<Property<bool>>,
    pub ints: Vec<Property<i32>>,
    pub floats: Vec<Property<f32>>,
    pub texts: Vec<Property<String>>,
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::deployable()
    }
}

impl PropertyRegistry {
    /// Descriptors for [`DeployableProperties`].
    pub fn deployable() -> Self {
        Self {
            bools: vec![
                Property::new("Active", |p| p.active, |p, v| p.active = v),
                Property::new("Dark Tint", |p| p.dark_tint, |p, v| p.dark_tint = v),
            ],
            ints: vec![Property::new("Custom Int", |p| p.custom_int, |p, v| p.custom_int = v)],
            floats: vec![Property::new(
                "Custom Float",
                |p| p.custom_float,
                |p, v| p.custom_float = v,
            )],
            texts: vec![Property::new(
                "Display Name",
                |p| p.display_name.clone(),
                |p, v| p.display_name = v,
            )],
        }
    }

    pub fn len(&self) -> usize {
        self.bools.len() + self.ints.len() + self.floats.len() + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current values in panel order: bools, ints, floats, then text.
    pub fn read_all(&self, props: &DeployableProperties) -> Vec<PropertyEntry> {
        let mut entries = Vec::with_capacity(self.len());
        entries.extend(self.bools.iter().map(|d| entry(d.name, PropertyValue::Bool(d.get(props)))));
        entries.extend(self.ints.iter().map(|d| entry(d.name, PropertyValue::Int(d.get(props)))));
        entries.extend(self.floats.iter().map(|d| entry(d.name, PropertyValue::Float(d.get(props)))));
        entries.extend(self.texts.iter().map(|d| entry(d.name, PropertyValue::Text(d.get(props)))));
        entries
    }

    /// Kind of the property registered under `name`.
    pub fn kind_of(&self, name: &str) -> Option<PropertyKind> {
        if self.bools.iter().any(|d| d.name == name) {
            Some(PropertyKind::Bool)
        } else if self.ints.iter().any(|d| d.name == name) {
            Some(PropertyKind::Int)
        } else if self.floats.iter().any(|d| d.name == name) {
            Some(PropertyKind::Float)
        } else if self.texts.iter().any(|d| d.name == name) {
            Some(PropertyKind::Text)
        } else {
            None
        }
    }

    /// Write `value` through the setter registered under `name`.
    pub fn write(
        &self,
        props: &mut DeployableProperties,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        let expected = self
            .kind_of(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))?;

        let mismatch = |found: PropertyKind| PropertyError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        };

        match value {
            PropertyValue::Bool(v) => find(&self.bools, name).ok_or(mismatch(PropertyKind::Bool))?.set(props, v),
            PropertyValue::Int(v) => find(&self.ints, name).ok_or(mismatch(PropertyKind::Int))?.set(props, v),
            PropertyValue::Float(v) => find(&self.floats, name).ok_or(mismatch(PropertyKind::Float))?.set(props, v),
            PropertyValue::Text(v) => find(&self.texts, name).ok_or(mismatch(PropertyKind::Text))?.set(props, v),
        }
        Ok(())
    }
}

fn entry(name: &str, value: PropertyValue) -> PropertyEntry {
    PropertyEntry {
        name: name.to_string(),
        value,
    }
}

fn find<'a, T>(list: &'a [Property<T>], name: &str) -> Option<&'a Property<T>> {
    list.iter().find(|d| d.name == name)
}
