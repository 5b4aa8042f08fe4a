//! Affine transform model shared by all elements.
//!
//! A transform is applied as translate ∘ rotate ∘ scale, with the rotation
//! taken about the element's own scaled center. Sizes are always expressed
//! in local, pre-scale units; consumers replace the whole value on every
//! mutation rather than patching individual fields.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed scale factor on either axis.
pub const MIN_SCALE: f64 = 0.1;

/// Placement of an element on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees, normalized to `(-180, 180]`.
    pub rotate_degrees: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate_degrees: 0.0,
        }
    }
}

impl Transform {
    /// Create a transform at the given canvas position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::default()
        }
    }

    /// Current translation as a vector.
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Rotation in radians.
    pub fn rotation_radians(&self) -> f64 {
        self.rotate_degrees.to_radians()
    }

    /// Replacement with a new translation.
    pub fn translated(&self, translation: Vec2) -> Self {
        Self {
            translate_x: translation.x,
            translate_y: translation.y,
            ..*self
        }
    }

    /// Replacement with new scale factors, clamped to [`MIN_SCALE`].
    pub fn scaled(&self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            scale_x: scale_x.max(MIN_SCALE),
            scale_y: scale_y.max(MIN_SCALE),
            ..*self
        }
    }

    /// Replacement with a new rotation, normalized to `(-180, 180]`.
    pub fn rotated(&self, degrees: f64) -> Self {
        Self {
            rotate_degrees: normalize_degrees(degrees),
            ..*self
        }
    }

    /// The full placement matrix for an element of the given local size.
    ///
    /// Rotation is taken about the scaled center
    /// `(width·scale_x / 2, height·scale_y / 2)`.
    pub fn affine(&self, local_size: Size) -> Affine {
        let center = Point::new(
            local_size.width * self.scale_x / 2.0,
            local_size.height * self.scale_y / 2.0,
        );
        Affine::translate(self.translation())
            * Affine::rotate_about(self.rotation_radians(), center)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Map a local point to canvas coordinates.
    pub fn to_absolute(&self, local_point: Point, local_size: Size) -> Point {
        self.affine(local_size) * local_point
    }

    /// Canvas position of the element's center.
    pub fn center(&self, local_size: Size) -> Point {
        Point::new(
            self.translate_x + local_size.width * self.scale_x / 2.0,
            self.translate_y + local_size.height * self.scale_y / 2.0,
        )
    }

    /// Map a canvas-space delta back into local units (un-rotate, un-scale).
    /// Used for offset math when dragging handles of a transformed element.
    pub fn invert_vec(&self, canvas_delta: Vec2) -> Vec2 {
        let theta = -self.rotation_radians();
        let (sin, cos) = theta.sin_cos();
        let unrotated = Vec2::new(
            canvas_delta.x * cos - canvas_delta.y * sin,
            canvas_delta.x * sin + canvas_delta.y * cos,
        );
        Vec2::new(unrotated.x / self.scale_x, unrotated.y / self.scale_y)
    }

    /// Map a canvas point into the element's local coordinate space.
    pub fn to_local(&self, canvas_point: Point, local_size: Size) -> Point {
        self.affine(local_size).inverse() * canvas_point
    }
}

/// Normalize an angle in degrees to `(-180, 180]`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let mut d = degrees % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}
