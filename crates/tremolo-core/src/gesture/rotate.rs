//! Rotate gesture from the handle above the element.

use kurbo::Point;

use super::ANGLE_SNAP_DEGREES;
use crate::input::Modifiers;
use crate::transform::normalize_degrees;

/// An in-flight rotation about an element's fixed center.
///
/// The pointer angle is accumulated move-to-move with unwrapping across
/// the ±π seam, so dragging through a full revolution never snaps the
/// element back by 360°.
#[derive(Debug)]
pub struct RotateGesture {
    center: Point,
    accumulated_radians: f64,
    last_pointer_radians: f64,
    moved: bool,
}

impl RotateGesture {
    /// Begin rotating. `center` is the element's canvas-space center
    /// (which is the rotation fixed point, so it does not move during the
    /// gesture) and `start_degrees` its current rotation.
    pub fn begin(center: Point, pointer: Point, start_degrees: f64) -> Self {
        Self {
            center,
            accumulated_radians: start_degrees.to_radians(),
            last_pointer_radians: pointer_angle(center, pointer),
            moved: false,
        }
    }

    /// Feed a pointer move; returns the new rotation in degrees,
    /// normalized to `(-180, 180]`.
    pub fn update(&mut self, pointer: Point, modifiers: Modifiers) -> f64 {
        let angle = pointer_angle(self.center, pointer);
        let mut delta = angle - self.last_pointer_radians;
        // Unwrap across the atan2 seam.
        if delta > std::f64::consts::PI {
            delta -= std::f64::consts::TAU;
        } else if delta < -std::f64::consts::PI {
            delta += std::f64::consts::TAU;
        }
        self.last_pointer_radians = angle;
        self.accumulated_radians += delta;
        self.moved = true;

        let mut degrees = self.accumulated_radians.to_degrees();
        if modifiers.shift {
            degrees = (degrees / ANGLE_SNAP_DEGREES).round() * ANGLE_SNAP_DEGREES;
        }
        normalize_degrees(degrees)
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }
}

fn pointer_angle(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x)
}
