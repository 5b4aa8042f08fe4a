//! Pointer and keyboard event types delivered by the host surface.
//!
//! The host converts its native events into these before handing them to
//! the editor. Positions are in screen coordinates; the editor maps them
//! into canvas space through the camera.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
///
/// `shift` drives axis/aspect/angle locking, `ctrl` drives grid snapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }
}

/// Pointer event phases for unified mouse/touch handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        modifiers: Modifiers,
    },
}

/// Editing commands mapped from keyboard shortcuts by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Delete the selected element.
    Delete,
    /// Zero the selected element's rotation, keeping translate/scale.
    ResetRotation,
    /// Toggle the crop overlay on a selected image.
    ToggleCrop,
    Undo,
    Redo,
}
