//! Element model: every kind of thing that can be placed on the canvas.
//!
//! Each kind is a plain struct in its own module; [`Element`] wraps them
//! in an enum and dispatches the shared surface (id, transform, sizing,
//! hit testing). Serialization is adjacently tagged so each element
//! serializes as a `{ "type": ..., "data": ... }` record.

mod board;
mod drawing;
mod image;
mod line;
mod media;
mod text;

pub use board::{Board, FretNote, GuitarString, note_name};
pub use drawing::Drawing;
pub use image::{CropRect, Image};
pub use line::{ConnectionRef, Line, LineStyle};
pub use media::{Audio, Video};
pub use text::{Code, Note, STICKY_DEFAULT_SIZE, Sticky, TextAlign};

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::Transform;

/// Unique identifier for an element within a workspace.
pub type ElementId = Uuid;

/// Hit slop for line hit testing, in canvas units.
const LINE_HIT_TOLERANCE: f64 = 6.0;

/// The four sides a connection can anchor to, at the border midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorSide {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "w")]
    West,
}

impl AnchorSide {
    pub const ALL: [AnchorSide; 4] = [
        AnchorSide::North,
        AnchorSide::East,
        AnchorSide::South,
        AnchorSide::West,
    ];

    /// The anchor's position in the element's local coordinate space.
    pub fn local_point(self, size: Size) -> Point {
        match self {
            AnchorSide::North => Point::new(size.width / 2.0, 0.0),
            AnchorSide::East => Point::new(size.width, size.height / 2.0),
            AnchorSide::South => Point::new(size.width / 2.0, size.height),
            AnchorSide::West => Point::new(0.0, size.height / 2.0),
        }
    }

    /// Unit vector pointing away from the element, before rotation.
    pub fn outward(self) -> Vec2 {
        match self {
            AnchorSide::North => Vec2::new(0.0, -1.0),
            AnchorSide::East => Vec2::new(1.0, 0.0),
            AnchorSide::South => Vec2::new(0.0, 1.0),
            AnchorSide::West => Vec2::new(-1.0, 0.0),
        }
    }
}

/// Discriminant for an element's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Note,
    Image,
    Video,
    Audio,
    Sticky,
    Code,
    Board,
    Line,
    Drawing,
}

/// How an element responds to the resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Resize adjusts the transform's scale factors.
    Scale { aspect_locked: bool },
    /// Resize mutates local width/height so content reflows.
    Reflow,
}

/// Any element that can live on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Element {
    Note(Note),
    Image(Image),
    Video(Video),
    Audio(Audio),
    Sticky(Sticky),
    Code(Code),
    Board(Board),
    Line(Line),
    Drawing(Drawing),
}

/// Applies the same body to every variant's payload.
macro_rules! each_element {
    ($value:expr, $e:ident => $body:expr) => {
        match $value {
            Element::Note($e) => $body,
            Element::Image($e) => $body,
            Element::Video($e) => $body,
            Element::Audio($e) => $body,
            Element::Sticky($e) => $body,
            Element::Code($e) => $body,
            Element::Board($e) => $body,
            Element::Line($e) => $body,
            Element::Drawing($e) => $body,
        }
    };
}

impl Element {
    pub fn id(&self) -> ElementId {
        each_element!(self, e => e.id)
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Note(_) => ElementKind::Note,
            Element::Image(_) => ElementKind::Image,
            Element::Video(_) => ElementKind::Video,
            Element::Audio(_) => ElementKind::Audio,
            Element::Sticky(_) => ElementKind::Sticky,
            Element::Code(_) => ElementKind::Code,
            Element::Board(_) => ElementKind::Board,
            Element::Line(_) => ElementKind::Line,
            Element::Drawing(_) => ElementKind::Drawing,
        }
    }

    pub fn transform(&self) -> &Transform {
        each_element!(self, e => &e.transform)
    }

    pub fn set_transform(&mut self, transform: Transform) {
        each_element!(self, e => e.transform = transform)
    }

    /// Untransformed size in local units. For lines this is the bounding
    /// box of the two endpoints.
    pub fn local_size(&self) -> Size {
        match self {
            Element::Note(e) => Size::new(e.width, e.height),
            Element::Image(e) => Size::new(e.width, e.height),
            Element::Video(e) => Size::new(e.width, e.height),
            Element::Audio(e) => Size::new(e.width, e.height),
            Element::Sticky(e) => Size::new(e.width, e.height),
            Element::Code(e) => Size::new(e.width, e.height),
            Element::Board(e) => Size::new(e.width, e.height),
            Element::Line(e) => Size::new(
                (e.end.x - e.start.x).abs(),
                (e.end.y - e.start.y).abs(),
            ),
            Element::Drawing(e) => Size::new(e.width, e.height),
        }
    }

    /// Set the local size of a reflowing element. No-op for kinds that
    /// resize via scale.
    pub fn set_local_size(&mut self, size: Size) {
        match self {
            Element::Note(e) => {
                e.width = size.width;
                e.height = size.height;
            }
            Element::Sticky(e) => {
                e.width = size.width;
                e.height = size.height;
            }
            Element::Code(e) => {
                e.width = size.width;
                e.height = size.height;
            }
            _ => {}
        }
    }

    /// Lines route between two points and never rotate as a unit.
    pub fn supports_rotation(&self) -> bool {
        !matches!(self, Element::Line(_))
    }

    pub fn resize_mode(&self) -> ResizeMode {
        match self {
            Element::Note(_) | Element::Sticky(_) | Element::Code(_) => ResizeMode::Reflow,
            Element::Image(_) | Element::Video(_) | Element::Audio(_) => {
                ResizeMode::Scale { aspect_locked: true }
            }
            Element::Board(_) | Element::Line(_) | Element::Drawing(_) => {
                ResizeMode::Scale { aspect_locked: false }
            }
        }
    }

    /// Assign a fresh id, used when pasting or duplicating.
    pub fn regenerate_id(&mut self) {
        let id = Uuid::new_v4();
        each_element!(self, e => e.id = id)
    }

    /// Whether a canvas point falls on this element.
    ///
    /// Box-like elements map the point into local space through the
    /// inverse transform and test against the local rect, so the test is
    /// exact under rotation and non-uniform scale. Lines test distance to
    /// the segment between their endpoints.
    pub fn hit_test(&self, canvas_point: Point) -> bool {
        match self {
            Element::Line(line) => {
                point_to_segment_dist(canvas_point, line.start, line.end) <= LINE_HIT_TOLERANCE
            }
            _ => {
                let size = self.local_size();
                let local = self.transform().to_local(canvas_point, size);
                local.x >= 0.0 && local.y >= 0.0 && local.x <= size.width && local.y <= size.height
            }
        }
    }

    /// Axis-aligned canvas bounds of the transformed element.
    pub fn bounds(&self) -> Rect {
        if let Element::Line(line) = self {
            return Rect::from_points(line.start, line.end);
        }
        let size = self.local_size();
        let t = self.transform();
        let corners = [
            Point::ZERO,
            Point::new(size.width, 0.0),
            Point::new(size.width, size.height),
            Point::new(0.0, size.height),
        ];
        let mut rect = Rect::from_points(
            t.to_absolute(corners[0], size),
            t.to_absolute(corners[1], size),
        );
        for corner in &corners[2..] {
            rect = rect.union_pt(t.to_absolute(*corner, size));
        }
        rect
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Element::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut Line> {
        match self {
            Element::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Element::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Element::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Distance from a point to a line segment.
pub(crate) fn point_to_segment_dist(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn test_serialized_record_shape() {
        let note = Note::new(Transform::at(10.0, 20.0), "hello");
        let value = serde_json::to_value(Element::Note(note)).unwrap();
        assert_eq!(value["type"], "note");
        assert_eq!(value["data"]["text"], "hello");
        assert_eq!(value["data"]["transform"]["translate_x"], 10.0);
    }

    #[test]
    fn test_round_trip_each_kind() {
        let elements = vec![
            Element::Note(Note::new(Transform::default(), "n")),
            Element::Image(Image::new(Transform::default(), "img.png", 100.0, 80.0)),
            Element::Video(Video::new(Transform::default(), "v.mp4")),
            Element::Audio(Audio::new(Transform::default(), "a.mp3")),
            Element::Sticky(Sticky::new(Transform::default())),
            Element::Code(Code::new(Transform::default(), "fn main() {}", "rust")),
            Element::Board(Board::new(Transform::default())),
            Element::Line(Line::new(
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                LineStyle::Arc,
            )),
            Element::Drawing(Drawing::from_points(vec![
                Point::new(1.0, 2.0),
                Point::new(3.0, 4.0),
            ])),
        ];
        for element in elements {
            let json = serde_json::to_string(&element).unwrap();
            let back: Element = serde_json::from_str(&json).unwrap();
            assert_eq!(back.id(), element.id());
            assert_eq!(back.kind(), element.kind());
        }
    }

    #[test]
    fn test_hit_test_rotated_box() {
        let mut sticky = Sticky::new(Transform::at(100.0, 100.0));
        sticky.transform = sticky.transform.rotated(90.0);
        let element = Element::Sticky(sticky);
        // Center is invariant under rotation.
        let center = element.transform().center(element.local_size());
        assert!(element.hit_test(center));
        // The original unrotated top-left corner region is no longer covered:
        // a 225x150 box rotated 90° about its center leaves that corner.
        assert!(!element.hit_test(Point::new(101.0, 101.0)));
    }

    #[test]
    fn test_hit_test_line_tolerance() {
        let line = Element::Line(Line::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            LineStyle::Direct,
        ));
        assert!(line.hit_test(Point::new(50.0, 4.0)));
        assert!(!line.hit_test(Point::new(50.0, 10.0)));
        assert!(!line.hit_test(Point::new(120.0, 0.0)));
    }

    #[test]
    fn test_resize_modes() {
        let sticky = Element::Sticky(Sticky::new(Transform::default()));
        assert_eq!(sticky.resize_mode(), ResizeMode::Reflow);
        let image = Element::Image(Image::new(Transform::default(), "x", 10.0, 10.0));
        assert_eq!(
            image.resize_mode(),
            ResizeMode::Scale { aspect_locked: true }
        );
        let board = Element::Board(Board::new(Transform::default()));
        assert_eq!(
            board.resize_mode(),
            ResizeMode::Scale {
                aspect_locked: false
            }
        );
    }

    #[test]
    fn test_anchor_outward_matches_side() {
        assert_eq!(AnchorSide::North.outward(), Vec2::new(0.0, -1.0));
        assert_eq!(
            AnchorSide::East.local_point(Size::new(100.0, 50.0)),
            Point::new(100.0, 25.0)
        );
    }

    #[test]
    fn test_bounds_covers_rotated_corners() {
        let mut note = Note::new(Transform::at(0.0, 0.0), "n");
        note.width = 100.0;
        note.height = 0.0;
        note.transform = note.transform.rotated(90.0);
        let bounds = Element::Note(note).bounds();
        // A degenerate 100x0 box rotated 90° about its center spans y 0..100
        // at x = 50.
        assert!((bounds.width()).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_regenerate_id_changes_id() {
        let mut element = Element::Note(Note::new(Transform::default(), "n"));
        let before = element.id();
        element.regenerate_id();
        assert_ne!(element.id(), before);
    }
}
