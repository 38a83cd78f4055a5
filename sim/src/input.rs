//! Per-tick input delivered by the host.

use serde::{Deserialize, Serialize};

use crate::components::Position;

/// Editor mode selected on the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditorMode {
    Create,
    #[default]
    Edit,
    Erase,
    Play,
}

impl EditorMode {
    pub const ALL: [EditorMode; 4] = [
        EditorMode::Create,
        EditorMode::Edit,
        EditorMode::Erase,
        EditorMode::Play,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Create => "Create",
            EditorMode::Edit => "Edit",
            EditorMode::Erase => "Erase",
            EditorMode::Play => "Play",
        }
    }
}

/// Edge-detected pointer state for one tick, pointer in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Position,
    /// Button went down this tick.
    pub pressed: bool,
    /// Button is down this tick (after the press tick).
    pub held: bool,
    /// Button went up this tick.
    pub released: bool,
}

impl PointerInput {
    /// Pointer hovering with the button up.
    pub fn idle(position: Position) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn press(position: Position) -> Self {
        Self {
            position,
            pressed: true,
            ..Default::default()
        }
    }

    pub fn hold(position: Position) -> Self {
        Self {
            position,
            held: true,
            ..Default::default()
        }
    }

    pub fn release(position: Position) -> Self {
        Self {
            position,
            released: true,
            ..Default::default()
        }
    }

    /// Press and release inside the same tick.
    pub fn click(position: Position) -> Self {
        Self {
            position,
            pressed: true,
            released: true,
            ..Default::default()
        }
    }

    /// Whether the pointer should be sampled this tick.
    pub fn is_down(&self) -> bool {
        self.pressed || self.held
    }
}
