//! Anchor-based line routing.
//!
//! Lines route between concrete canvas points. Connected endpoints derive
//! their point from the target element's anchor on every pass, so routing
//! follows the target through drags, resizes, and rotations. The routed
//! geometry also carries a midpoint, used to place the line's label.

use kurbo::{BezPath, CubicBez, ParamCurve, ParamCurveArclen, Point, Vec2};
use log::warn;

use crate::element::{AnchorSide, Element, ElementId, Line, LineStyle};
use crate::workspace::Workspace;

/// How far, in canvas units, a dragged line endpoint snaps to an anchor.
pub const SNAP_RADIUS: f64 = 12.0;

/// Control-point distance for arc routing, in canvas units.
pub const CONTROL_OFFSET: f64 = 60.0;

/// Accuracy for cubic arc-length evaluation.
const ARCLEN_ACCURACY: f64 = 1e-6;

/// The routed geometry of one line.
#[derive(Debug, Clone)]
pub struct LinePath {
    pub path: BezPath,
    pub start: Point,
    pub end: Point,
    /// Point halfway along the path by arc length, for label placement.
    pub midpoint: Point,
}

/// Canvas position of one of an element's connection anchors.
pub fn anchor_point(element: &Element, side: AnchorSide) -> Point {
    let size = element.local_size();
    element.transform().to_absolute(side.local_point(size), size)
}

/// All four anchors of an element, in canvas coordinates.
pub fn element_anchors(element: &Element) -> [(AnchorSide, Point); 4] {
    AnchorSide::ALL.map(|side| (side, anchor_point(element, side)))
}

/// The nearest anchor within [`SNAP_RADIUS`] of a canvas point, searching
/// every element except `exclude` (the line being edited).
pub fn find_snap_target(
    workspace: &Workspace,
    point: Point,
    exclude: ElementId,
) -> Option<(ElementId, AnchorSide)> {
    let mut best: Option<(f64, ElementId, AnchorSide)> = None;
    for element in workspace.iter() {
        if element.id() == exclude || element.as_line().is_some() {
            continue;
        }
        for (side, anchor) in element_anchors(element) {
            let dist = (anchor - point).hypot();
            if dist <= SNAP_RADIUS && best.is_none_or(|(d, _, _)| dist < d) {
                best = Some((dist, element.id(), side));
            }
        }
    }
    best.map(|(_, id, side)| (id, side))
}

/// A resolved endpoint: its canvas point and, when connected, the rotated
/// outward direction of the anchor it sits on.
struct Endpoint {
    point: Point,
    outward: Option<Vec2>,
}

fn resolve_endpoint(
    workspace: &Workspace,
    fallback: Point,
    connection: Option<crate::element::ConnectionRef>,
) -> Endpoint {
    let Some(conn) = connection else {
        return Endpoint {
            point: fallback,
            outward: None,
        };
    };
    let Some(target) = workspace.get(conn.element_id) else {
        warn!(
            "line endpoint references missing element {}; using stored position",
            conn.element_id
        );
        return Endpoint {
            point: fallback,
            outward: None,
        };
    };
    let theta = target.transform().rotation_radians();
    let (sin, cos) = theta.sin_cos();
    let raw = conn.anchor.outward();
    Endpoint {
        point: anchor_point(target, conn.anchor),
        outward: Some(Vec2::new(
            raw.x * cos - raw.y * sin,
            raw.x * sin + raw.y * cos,
        )),
    }
}

/// Route a line through the workspace, producing its drawable path.
pub fn route(workspace: &Workspace, line: &Line) -> LinePath {
    let start = resolve_endpoint(workspace, line.start, line.start_connection);
    let end = resolve_endpoint(workspace, line.end, line.end_connection);

    match line.style {
        LineStyle::Direct => route_direct(start.point, end.point),
        LineStyle::Arc => route_arc(&start, &end),
        LineStyle::Corner => route_corner(&start, &end),
    }
}

fn route_direct(start: Point, end: Point) -> LinePath {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);
    LinePath {
        path,
        start,
        end,
        midpoint: start.lerp(end, 0.5),
    }
}

fn route_arc(start: &Endpoint, end: &Endpoint) -> LinePath {
    let dir_start = start
        .outward
        .unwrap_or_else(|| direction_toward(start.point, end.point));
    let dir_end = end
        .outward
        .unwrap_or_else(|| direction_toward(end.point, start.point));

    let cubic = CubicBez::new(
        start.point,
        start.point + dir_start * CONTROL_OFFSET,
        end.point + dir_end * CONTROL_OFFSET,
        end.point,
    );
    let half = cubic.arclen(ARCLEN_ACCURACY) / 2.0;
    let midpoint = cubic.eval(cubic.inv_arclen(half, ARCLEN_ACCURACY));

    let mut path = BezPath::new();
    path.move_to(cubic.p0);
    path.curve_to(cubic.p1, cubic.p2, cubic.p3);
    LinePath {
        path,
        start: start.point,
        end: end.point,
        midpoint,
    }
}

fn route_corner(start: &Endpoint, end: &Endpoint) -> LinePath {
    // Two elbow candidates; prefer the one whose first segment leaves
    // along the start anchor's outward direction.
    let horizontal_first = Point::new(end.point.x, start.point.y);
    let vertical_first = Point::new(start.point.x, end.point.y);
    let elbow = match start.outward {
        Some(dir) => {
            let toward_h = horizontal_first - start.point;
            let toward_v = vertical_first - start.point;
            if dir.dot(toward_h) >= dir.dot(toward_v) {
                horizontal_first
            } else {
                vertical_first
            }
        }
        None => horizontal_first,
    };

    let midpoint = polyline_midpoint(&[start.point, elbow, end.point]);
    let mut path = BezPath::new();
    path.move_to(start.point);
    path.line_to(elbow);
    path.line_to(end.point);
    LinePath {
        path,
        start: start.point,
        end: end.point,
        midpoint,
    }
}

fn direction_toward(from: Point, to: Point) -> Vec2 {
    let v = to - from;
    let len = v.hypot();
    if len < f64::EPSILON {
        Vec2::new(1.0, 0.0)
    } else {
        v / len
    }
}

fn polyline_midpoint(points: &[Point]) -> Point {
    let total: f64 = points.windows(2).map(|w| (w[1] - w[0]).hypot()).sum();
    let mut remaining = total / 2.0;
    for w in points.windows(2) {
        let len = (w[1] - w[0]).hypot();
        if remaining <= len {
            let t = if len < f64::EPSILON { 0.0 } else { remaining / len };
            return w[0].lerp(w[1], t);
        }
        remaining -= len;
    }
    *points.last().unwrap_or(&Point::ZERO)
}

/// Refresh the stored endpoints of every line connected to `moved_id`,
/// returning the ids of the lines that changed.
pub fn reroute_for(workspace: &mut Workspace, moved_id: ElementId) -> Vec<ElementId> {
    let mut updates: Vec<(ElementId, Option<Point>, Option<Point>)> = Vec::new();
    for element in workspace.iter() {
        let Some(line) = element.as_line() else {
            continue;
        };
        if !line.references(moved_id) {
            continue;
        }
        let new_start = line
            .start_connection
            .filter(|c| c.element_id == moved_id)
            .and_then(|c| workspace.get(c.element_id).map(|t| anchor_point(t, c.anchor)));
        let new_end = line
            .end_connection
            .filter(|c| c.element_id == moved_id)
            .and_then(|c| workspace.get(c.element_id).map(|t| anchor_point(t, c.anchor)));
        updates.push((line.id, new_start, new_end));
    }

    let mut changed = Vec::with_capacity(updates.len());
    for (line_id, new_start, new_end) in updates {
        if let Some(line) = workspace.get_mut(line_id).and_then(Element::as_line_mut) {
            if let Some(p) = new_start {
                line.start = p;
            }
            if let Some(p) = new_end {
                line.end = p;
            }
            changed.push(line_id);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ConnectionRef, Note};
    use crate::transform::Transform;

    fn note_element(x: f64, y: f64) -> Element {
        // Notes are 200x50.
        Element::Note(Note::new(Transform::at(x, y), "n"))
    }

    fn connect(line: &mut Line, target: ElementId, start_side: AnchorSide, end_side: AnchorSide, end_target: ElementId) {
        line.start_connection = Some(ConnectionRef {
            element_id: target,
            anchor: start_side,
        });
        line.end_connection = Some(ConnectionRef {
            element_id: end_target,
            anchor: end_side,
        });
    }

    #[test]
    fn test_anchor_points_at_border_midpoints() {
        let element = note_element(100.0, 200.0);
        assert_eq!(
            anchor_point(&element, AnchorSide::North),
            Point::new(200.0, 200.0)
        );
        assert_eq!(
            anchor_point(&element, AnchorSide::East),
            Point::new(300.0, 225.0)
        );
    }

    #[test]
    fn test_snap_finds_nearest_anchor() {
        let mut ws = Workspace::new();
        let a = ws.add(note_element(0.0, 0.0));
        let _far = ws.add(note_element(1000.0, 1000.0));
        let line_id = ws.add(Element::Line(Line::new(
            Point::ZERO,
            Point::new(10.0, 10.0),
            LineStyle::Direct,
        )));

        // East anchor of `a` is at (200, 25).
        let hit = find_snap_target(&ws, Point::new(205.0, 30.0), line_id);
        assert_eq!(hit, Some((a, AnchorSide::East)));

        // Outside the snap radius.
        assert!(find_snap_target(&ws, Point::new(230.0, 25.0), line_id).is_none());
    }

    #[test]
    fn test_snap_ignores_lines_and_self() {
        let mut ws = Workspace::new();
        let line_id = ws.add(Element::Line(Line::new(
            Point::ZERO,
            Point::new(10.0, 0.0),
            LineStyle::Direct,
        )));
        assert!(find_snap_target(&ws, Point::new(5.0, 0.0), line_id).is_none());
    }

    #[test]
    fn test_direct_midpoint_is_halfway() {
        let ws = Workspace::new();
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), LineStyle::Direct);
        let routed = route(&ws, &line);
        assert_eq!(routed.midpoint, Point::new(50.0, 0.0));
    }

    #[test]
    fn test_arc_bows_out_of_connected_sides() {
        let mut ws = Workspace::new();
        let a = ws.add(note_element(0.0, 0.0));
        let b = ws.add(note_element(400.0, 0.0));
        let mut line = Line::new(Point::ZERO, Point::ZERO, LineStyle::Arc);
        connect(&mut line, a, AnchorSide::East, AnchorSide::West, b);

        let routed = route(&ws, &line);
        assert_eq!(routed.start, Point::new(200.0, 25.0));
        assert_eq!(routed.end, Point::new(400.0, 25.0));
        // A symmetric horizontal arc's midpoint sits on the segment center.
        assert!((routed.midpoint.x - 300.0).abs() < 1e-3);
        assert!((routed.midpoint.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_corner_leaves_along_start_anchor() {
        let mut ws = Workspace::new();
        let a = ws.add(note_element(0.0, 0.0));
        let b = ws.add(note_element(400.0, 400.0));
        let mut line = Line::new(Point::ZERO, Point::ZERO, LineStyle::Corner);
        connect(&mut line, a, AnchorSide::South, AnchorSide::West, b);

        let routed = route(&ws, &line);
        // Start at a's south anchor (100, 50); leaving south means the
        // first segment is vertical, so the elbow shares start.x.
        assert_eq!(routed.start, Point::new(100.0, 50.0));
        let elements: Vec<kurbo::PathEl> = routed.path.elements().to_vec();
        match elements[1] {
            kurbo::PathEl::LineTo(elbow) => {
                assert!((elbow.x - 100.0).abs() < 1e-9);
                assert!((elbow.y - 425.0).abs() < 1e-9);
            }
            ref other => panic!("expected elbow segment, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_connection_falls_back_to_stored_point() {
        let ws = Workspace::new();
        let mut line = Line::new(Point::new(5.0, 5.0), Point::new(50.0, 5.0), LineStyle::Direct);
        line.start_connection = Some(ConnectionRef {
            element_id: uuid::Uuid::new_v4(),
            anchor: AnchorSide::North,
        });
        let routed = route(&ws, &line);
        assert_eq!(routed.start, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_translation_moves_connected_endpoint_by_same_delta() {
        for style in [LineStyle::Direct, LineStyle::Arc, LineStyle::Corner] {
            let mut ws = Workspace::new();
            let a = ws.add(note_element(0.0, 0.0));
            let b = ws.add(note_element(400.0, 300.0));
            let mut line = Line::new(Point::ZERO, Point::ZERO, style);
            connect(&mut line, a, AnchorSide::East, AnchorSide::North, b);
            let line_id = ws.add(Element::Line(line));
            reroute_for(&mut ws, a);
            reroute_for(&mut ws, b);

            let before = {
                let l = ws.get(line_id).unwrap().as_line().unwrap().clone();
                route(&ws, &l)
            };

            let t = ws.get(a).unwrap().transform().translated(kurbo::Vec2::new(70.0, -30.0));
            ws.get_mut(a).unwrap().set_transform(t);
            let changed = reroute_for(&mut ws, a);
            assert_eq!(changed, vec![line_id]);

            let after = {
                let l = ws.get(line_id).unwrap().as_line().unwrap().clone();
                route(&ws, &l)
            };
            assert!((after.start.x - (before.start.x + 70.0)).abs() < 1e-9);
            assert!((after.start.y - (before.start.y - 30.0)).abs() < 1e-9);
            // The other endpoint stays put.
            assert_eq!(after.end, before.end);
        }
    }

    #[test]
    fn test_rotated_target_moves_anchor() {
        let mut ws = Workspace::new();
        let a = ws.add(note_element(0.0, 0.0));
        let t = ws.get(a).unwrap().transform().rotated(180.0);
        ws.get_mut(a).unwrap().set_transform(t);
        // Under 180° the north anchor lands where south was.
        let north = anchor_point(ws.get(a).unwrap(), AnchorSide::North);
        assert!((north.x - 100.0).abs() < 1e-9);
        assert!((north.y - 50.0).abs() < 1e-9);
    }
}
