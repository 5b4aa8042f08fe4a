//! Connecting line element.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AnchorSide, ElementId};
use crate::transform::Transform;

/// Geometry style for the routed line path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Straight segment between endpoints.
    #[default]
    Direct,
    /// Cubic S-curve bowing outward from the connected sides.
    Arc,
    /// Two axis-aligned segments through an elbow point.
    Corner,
}

/// A weak reference to another element's connection anchor.
///
/// Resolved by id lookup at routing time; the target may have been
/// deleted, in which case the line falls back to its explicit endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub element_id: ElementId,
    pub anchor: AnchorSide,
}

/// A line between two points, optionally anchored to other elements.
///
/// `start`/`end` always hold concrete canvas coordinates. When a
/// connection is present the coordinate is derived from the target's
/// current transform on every re-route and written back here, so a
/// dangling reference degrades to the last known position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: ElementId,
    pub transform: Transform,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_connection: Option<ConnectionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_connection: Option<ConnectionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Line {
    pub fn new(start: Point, end: Point, style: LineStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform: Transform::default(),
            start,
            end,
            style,
            start_connection: None,
            end_connection: None,
            label: None,
        }
    }

    /// Whether either endpoint references the given element.
    pub fn references(&self, id: ElementId) -> bool {
        self.start_connection.map(|c| c.element_id) == Some(id)
            || self.end_connection.map(|c| c.element_id) == Some(id)
    }
}
