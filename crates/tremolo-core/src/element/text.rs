//! Text-bearing elements: plain notes, sticky notes, and code blocks.
//!
//! All three reflow their content when resized, so the resize gesture
//! mutates their local width/height directly instead of scaling.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ElementId;
use crate::transform::Transform;

/// Default sticky note size in local units.
pub const STICKY_DEFAULT_SIZE: Size = Size::new(225.0, 150.0);

/// Horizontal text alignment for sticky notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A plain floating text note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    pub text: String,
}

impl Note {
    pub fn new(transform: Transform, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width: 200.0,
            height: 50.0,
            text: text.into(),
        }
    }
}

/// A colored sticky note with aligned, refittable text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sticky {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    pub text: String,
    /// Fill color as a CSS hex string.
    pub color: String,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

fn default_font_size() -> f64 {
    16.0
}

impl Sticky {
    pub fn new(transform: Transform) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width: STICKY_DEFAULT_SIZE.width,
            height: STICKY_DEFAULT_SIZE.height,
            text: String::new(),
            color: "#f4e285".to_string(),
            align: TextAlign::default(),
            font_size: default_font_size(),
        }
    }
}

/// A syntax-highlighted code block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Code {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    pub source: String,
    pub language: String,
    /// False when the highlighter was unavailable; the renderer then
    /// falls back to plain text.
    #[serde(default)]
    pub highlighted: bool,
}

impl Code {
    pub fn new(transform: Transform, source: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width: 400.0,
            height: 220.0,
            source: source.into(),
            language: language.into(),
            highlighted: false,
        }
    }
}
