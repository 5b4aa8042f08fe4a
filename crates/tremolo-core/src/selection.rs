//! Single-element selection and its handle decorations.

use kurbo::{Point, Vec2};

use crate::element::{AnchorSide, Element, ElementId};

/// Screen distance the rotate handle sits above the element's top edge,
/// in local units.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// What the selection is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected,
    /// An image is selected and its crop overlay is open.
    Cropping,
}

/// Notification that the selection changed, for host UI sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Changed {
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
}

/// Tracks the single selected element. At most one element is selected at
/// a time; selecting another replaces the previous selection.
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: Option<ElementId>,
    state: SelectionState,
    events: Vec<SelectionEvent>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    /// Select an element. Re-selecting the current element is a no-op and
    /// emits no event, but does exit crop mode.
    pub fn select(&mut self, id: ElementId) {
        if self.selected == Some(id) {
            self.state = SelectionState::Selected;
            return;
        }
        let previous = self.selected.replace(id);
        self.state = SelectionState::Selected;
        self.events.push(SelectionEvent::Changed {
            previous,
            current: Some(id),
        });
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.selected.take() {
            self.state = SelectionState::Idle;
            self.events.push(SelectionEvent::Changed {
                previous: Some(previous),
                current: None,
            });
        }
    }

    /// Enter crop mode for the current selection. Returns false when
    /// nothing is selected.
    pub fn begin_cropping(&mut self) -> bool {
        if self.selected.is_some() {
            self.state = SelectionState::Cropping;
            true
        } else {
            false
        }
    }

    /// Leave crop mode, keeping the selection.
    pub fn end_cropping(&mut self) {
        if self.state == SelectionState::Cropping {
            self.state = SelectionState::Selected;
        }
    }

    /// Drain queued selection events in order.
    pub fn take_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Canvas-space geometry of the selection handles for a box element.
#[derive(Debug, Clone)]
pub struct Decorations {
    /// The four transformed corners, clockwise from the local origin.
    pub outline: [Point; 4],
    /// Resize handle at the transformed bottom-right corner.
    pub resize_handle: Point,
    /// Rotate handle floating above the top edge, `None` for elements
    /// that do not rotate.
    pub rotate_handle: Option<Point>,
    /// Connection anchors at the border midpoints.
    pub anchors: [(AnchorSide, Point); 4],
}

/// Canvas-space endpoint grips for a selected line.
#[derive(Debug, Clone, Copy)]
pub struct LineDecorations {
    pub start: Point,
    pub end: Point,
}

/// Handle geometry for the current selection.
#[derive(Debug, Clone)]
pub enum SelectionDecorations {
    Box(Decorations),
    Line(LineDecorations),
}

/// Compute handle geometry for a selected element. Lines get endpoint
/// grips instead of a box outline.
pub fn decorations(element: &Element) -> SelectionDecorations {
    if let Some(line) = element.as_line() {
        return SelectionDecorations::Line(LineDecorations {
            start: line.start,
            end: line.end,
        });
    }

    let size = element.local_size();
    let t = element.transform();
    let corners = [
        t.to_absolute(Point::ZERO, size),
        t.to_absolute(Point::new(size.width, 0.0), size),
        t.to_absolute(Point::new(size.width, size.height), size),
        t.to_absolute(Point::new(0.0, size.height), size),
    ];

    let rotate_handle = element.supports_rotation().then(|| {
        t.to_absolute(
            Point::new(size.width / 2.0, -ROTATE_HANDLE_OFFSET / t.scale_y),
            size,
        )
    });

    let anchors = AnchorSide::ALL
        .map(|side| (side, t.to_absolute(side.local_point(size), size)));

    SelectionDecorations::Box(Decorations {
        outline: corners,
        resize_handle: corners[2],
        rotate_handle,
        anchors,
    })
}

/// True when the canvas point falls within `radius` of the handle point.
pub fn hits_handle(handle: Point, canvas_point: Point, radius: f64) -> bool {
    Vec2::new(handle.x - canvas_point.x, handle.y - canvas_point.y).hypot() <= radius
}
