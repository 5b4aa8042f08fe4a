//! Freehand drawing element.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ElementId;
use crate::transform::Transform;

/// A freehand stroke captured from pointer input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawing {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    /// Stroke points in local units relative to the drawing's origin.
    pub points: Vec<Point>,
}

impl Drawing {
    /// Build a drawing from canvas-space stroke points, normalizing them
    /// to a local origin at the stroke's bounding-box corner.
    pub fn from_points(points: Vec<Point>) -> Self {
        let (min_x, min_y) = points.iter().fold((f64::INFINITY, f64::INFINITY), |acc, p| {
            (acc.0.min(p.x), acc.1.min(p.y))
        });
        let (max_x, max_y) = points
            .iter()
            .fold((f64::NEG_INFINITY, f64::NEG_INFINITY), |acc, p| {
                (acc.0.max(p.x), acc.1.max(p.y))
            });

        let (origin_x, origin_y) = if points.is_empty() {
            (0.0, 0.0)
        } else {
            (min_x, min_y)
        };
        let local: Vec<Point> = points
            .iter()
            .map(|p| Point::new(p.x - origin_x, p.y - origin_y))
            .collect();

        Self {
            id: Uuid::new_v4(),
            transform: Transform::at(origin_x, origin_y),
            width: if points.is_empty() { 0.0 } else { max_x - min_x },
            height: if points.is_empty() { 0.0 } else { max_y - min_y },
            points: local,
        }
    }
}
