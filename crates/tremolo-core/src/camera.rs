//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform for the workspace.
///
/// It handles panning (translation) and zooming (scaling), converting
/// between host screen coordinates and canvas coordinates. Gesture code
/// re-applies the conversion on every pointer move so that mid-gesture
/// pan/zoom changes never teleport the dragged element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The affine transform converting canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// The inverse transform, for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a host screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let canvas_point = self.screen_to_canvas(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so canvas_point stays under screen_point.
        let new_screen = self.canvas_to_screen(canvas_point);
        self.offset += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// The persisted pan/zoom state for the document's trailing meta record.
    pub fn meta(&self) -> ZoomMeta {
        ZoomMeta {
            x: self.offset.x,
            y: self.offset.y,
            k: self.zoom,
        }
    }

    /// Restore pan/zoom from a persisted meta record.
    pub fn apply_meta(&mut self, meta: ZoomMeta) {
        self.offset = Vec2::new(meta.x, meta.y);
        self.zoom = meta.k.clamp(self.min_zoom, self.max_zoom);
    }
}

/// Pan/zoom state as stored in the document's `{type: "meta"}` record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomMeta {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_canvas_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let canvas = camera.screen_to_canvas(screen);
        assert!((canvas.x - screen.x).abs() < f64::EPSILON);
        assert!((canvas.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_offset_and_zoom() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        camera.zoom = 2.0;
        let canvas = camera.screen_to_canvas(Point::new(150.0, 300.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.canvas_to_screen(camera.screen_to_canvas(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera::new();
        let screen = Point::new(400.0, 300.0);
        let before = camera.screen_to_canvas(screen);
        camera.zoom_at(screen, 2.0);
        let after = camera.screen_to_canvas(screen);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);

        camera.zoom = 1.0;
        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meta_round_trip() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(12.0, -4.0);
        camera.zoom = 2.5;

        let mut restored = Camera::new();
        restored.apply_meta(camera.meta());
        assert_eq!(restored.offset, camera.offset);
        assert!((restored.zoom - camera.zoom).abs() < f64::EPSILON);
    }
}
