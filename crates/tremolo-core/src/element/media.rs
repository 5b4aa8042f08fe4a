//! Embedded media elements (video and audio).
//!
//! The embeds themselves are rendered by the host; these elements only
//! carry placement and the source URL. Audio may carry timed lyrics.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ElementId;
use crate::transform::Transform;

/// An embedded video player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    pub url: String,
}

impl Video {
    pub fn new(transform: Transform, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width: 480.0,
            height: 270.0,
            url: url.into(),
        }
    }
}

/// An embedded audio player, optionally with LRC-style lyrics text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audio {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

impl Audio {
    pub fn new(transform: Transform, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width: 320.0,
            height: 60.0,
            url: url.into(),
            lyrics: None,
        }
    }
}
