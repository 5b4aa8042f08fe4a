//! Pointer gesture state machines: drag, resize, rotate, and crop.
//!
//! Each gesture is begun from a pointer-down, fed canvas-space pointer
//! positions on every move, and produces replacement transforms (or crop
//! rects) rather than incremental mutations. Modifier keys are sampled
//! per move, so holding or releasing shift/ctrl mid-gesture takes effect
//! immediately.

mod crop;
mod drag;
mod resize;
mod rotate;

pub use crop::CropSession;
pub use drag::{DragGesture, DragUpdate};
pub use resize::{ResizeGesture, ResizeUpdate};
pub use rotate::RotateGesture;

/// Grid pitch, in canvas units, used for ctrl-key position and size
/// snapping.
pub const GRID_SIZE: f64 = 10.0;

/// Angle pitch, in degrees, used for shift-key rotation snapping.
pub const ANGLE_SNAP_DEGREES: f64 = 15.0;

pub(crate) fn snap_to_grid(value: f64) -> f64 {
    (value / GRID_SIZE).round() * GRID_SIZE
}
