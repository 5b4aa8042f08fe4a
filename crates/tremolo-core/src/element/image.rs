//! Image element with an optional axis-aligned crop rectangle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ElementId;
use crate::transform::Transform;

/// Axis-aligned crop rectangle in the image's local units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Crop covering the full local bounds of an image.
    pub fn full(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// A placed raster image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: ElementId,
    pub transform: Transform,
    /// Display size in local units; the crop rectangle is clamped to it.
    pub width: f64,
    pub height: f64,
    /// Source URL or data URI; decoding happens in the host renderer.
    pub source: String,
    /// Pixel dimensions of the decoded source, patched in asynchronously
    /// once the load resolves. Zero until then.
    #[serde(default)]
    pub natural_width: f64,
    #[serde(default)]
    pub natural_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
}

impl Image {
    pub fn new(transform: Transform, source: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width,
            height,
            source: source.into(),
            natural_width: 0.0,
            natural_height: 0.0,
            crop: None,
        }
    }
}
