//! The editor: glues the workspace, selection, gestures, router, history,
//! and resource tracker behind a pointer/command event interface.
//!
//! Hosts feed screen-space pointer events and keyboard commands in, then
//! drain [`EditorEvent`]s to know what to redraw or sync. All gesture
//! math happens in canvas coordinates; the conversion through the camera
//! is re-applied on every move so mid-gesture pan or zoom never
//! teleports the dragged element.

use std::collections::HashSet;

use kurbo::Point;
use log::warn;

use crate::element::{AnchorSide, ConnectionRef, Element, ElementId, Line, LineStyle};
use crate::gesture::{CropSession, DragGesture, ResizeGesture, RotateGesture};
use crate::history::{ActionHint, History, HistoryEntry};
use crate::input::{Command, Modifiers, MouseButton, PointerEvent};
use crate::resource::{LoadTicket, ResourceOutcome, ResourceTracker};
use crate::router;
use crate::selection::{SelectionDecorations, SelectionEvent, SelectionManager, decorations, hits_handle};
use crate::workspace::{DocumentError, Workspace};

/// Hit radius for selection handles, in canvas units.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Which end of a line is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnd {
    Start,
    End,
}

#[derive(Debug)]
enum ActiveGesture {
    None,
    Drag {
        id: ElementId,
        gesture: DragGesture,
    },
    Resize {
        id: ElementId,
        gesture: ResizeGesture,
    },
    Rotate {
        id: ElementId,
        gesture: RotateGesture,
    },
    /// An edge of the open crop overlay is being dragged.
    CropEdge,
    LineEndpoint {
        id: ElementId,
        end: LineEnd,
        /// Set when the line was created by this gesture, holding the
        /// element to re-select if the press never went anywhere.
        created_from: Option<ElementId>,
    },
}

/// Notifications for the host, drained after each input event.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SelectionChanged {
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
    /// A mutating gesture produced its first actual change.
    GestureStarted(ActionHint),
    /// An element's transform was replaced.
    TransformChanged(ElementId),
    /// These lines had a connected endpoint refreshed.
    LinesRerouted(Vec<ElementId>),
    /// A reflow element changed local size; the host should re-lay out
    /// its text.
    ReflowRequested(ElementId),
    ElementCreated(ElementId),
    /// An element changed without being created or removed.
    ElementPatched(ElementId),
    ElementRemoved(ElementId),
    /// The whole document was swapped, e.g. by load or undo of a paste.
    DocumentReplaced,
}

/// The interactive scene engine for one board.
pub struct Editor {
    pub workspace: Workspace,
    selection: SelectionManager,
    history: History,
    resources: ResourceTracker,
    active: ActiveGesture,
    crop: Option<(ElementId, CropSession)>,
    events: Vec<EditorEvent>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            selection: SelectionManager::new(),
            history: History::new(),
            resources: ResourceTracker::new(),
            active: ActiveGesture::None,
            crop: None,
            events: Vec::new(),
        }
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain queued events, selection changes first.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        let mut events: Vec<EditorEvent> = self
            .selection
            .take_events()
            .into_iter()
            .map(|SelectionEvent::Changed { previous, current }| EditorEvent::SelectionChanged {
                previous,
                current,
            })
            .collect();
        events.append(&mut self.events);
        events
    }

    /// Insert a new element on top, selected, as one undoable step.
    pub fn insert(&mut self, element: Element) -> Result<ElementId, DocumentError> {
        // Moving the selection away closes any open crop overlay.
        self.commit_crop()?;
        let before = self.snapshot_entry(None, Some(ActionHint::Create))?;
        self.history.open_pending(before);
        let id = self.workspace.add(element);
        self.selection.select(id);
        self.events.push(EditorEvent::ElementCreated(id));
        self.commit_history()?;
        Ok(id)
    }

    /// Feed a host pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Result<(), DocumentError> {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                if button == MouseButton::Left {
                    let canvas = self.workspace.camera.screen_to_canvas(position);
                    self.pointer_down(canvas, modifiers)?;
                }
            }
            PointerEvent::Move {
                position,
                modifiers,
            } => {
                let canvas = self.workspace.camera.screen_to_canvas(position);
                self.pointer_move(canvas, modifiers);
            }
            PointerEvent::Up { .. } => {
                self.pointer_up()?;
            }
        }
        Ok(())
    }

    fn pointer_down(&mut self, canvas: Point, _modifiers: Modifiers) -> Result<(), DocumentError> {
        // An open crop overlay captures the pointer: edge handles start an
        // edge drag, anywhere else commits the crop first.
        if self.crop.is_some() {
            if self.try_begin_crop_edge(canvas) {
                return Ok(());
            }
            self.commit_crop()?;
        }

        // Handles of the current selection take priority over elements.
        if self.try_begin_handle_gesture(canvas)? {
            return Ok(());
        }

        match self.workspace.hit_test(canvas) {
            Some(id) => {
                self.selection.select(id);
                self.begin_drag(id, canvas)?;
            }
            None => self.selection.clear(),
        }
        Ok(())
    }

    fn try_begin_crop_edge(&mut self, canvas: Point) -> bool {
        let Some((crop_id, session)) = &mut self.crop else {
            return false;
        };
        let Some(element) = self.workspace.get(*crop_id) else {
            return false;
        };
        let size = element.local_size();
        let local = element.transform().to_local(canvas, size);
        let rect = session.rect();
        let handles = [
            (AnchorSide::North, Point::new(rect.x + rect.width / 2.0, rect.y)),
            (
                AnchorSide::East,
                Point::new(rect.x + rect.width, rect.y + rect.height / 2.0),
            ),
            (
                AnchorSide::South,
                Point::new(rect.x + rect.width / 2.0, rect.y + rect.height),
            ),
            (AnchorSide::West, Point::new(rect.x, rect.y + rect.height / 2.0)),
        ];
        for (edge, handle) in handles {
            if hits_handle(handle, local, HANDLE_RADIUS) {
                session.begin_edge(edge);
                self.active = ActiveGesture::CropEdge;
                return true;
            }
        }
        false
    }

    fn try_begin_handle_gesture(&mut self, canvas: Point) -> Result<bool, DocumentError> {
        let Some(id) = self.selection.current() else {
            return Ok(false);
        };
        let Some(element) = self.workspace.get(id) else {
            return Ok(false);
        };
        let kind = element.kind();
        let center = element.transform().center(element.local_size());
        let start_degrees = element.transform().rotate_degrees;

        match decorations(element) {
            SelectionDecorations::Box(handles) => {
                let rotate_hit = handles
                    .rotate_handle
                    .is_some_and(|rotate| hits_handle(rotate, canvas, HANDLE_RADIUS));
                if rotate_hit {
                    self.open_gesture_history(kind, ActionHint::Rotate)?;
                    self.active = ActiveGesture::Rotate {
                        id,
                        gesture: RotateGesture::begin(center, canvas, start_degrees),
                    };
                    return Ok(true);
                }
                if hits_handle(handles.resize_handle, canvas, HANDLE_RADIUS) {
                    let gesture = ResizeGesture::begin(element, canvas);
                    self.open_gesture_history(kind, ActionHint::Resize)?;
                    self.active = ActiveGesture::Resize { id, gesture };
                    return Ok(true);
                }
                for (side, anchor) in handles.anchors {
                    if hits_handle(anchor, canvas, HANDLE_RADIUS) {
                        self.begin_line_from_anchor(id, side, anchor)?;
                        return Ok(true);
                    }
                }
            }
            SelectionDecorations::Line(grips) => {
                let end = if hits_handle(grips.start, canvas, HANDLE_RADIUS) {
                    Some(LineEnd::Start)
                } else if hits_handle(grips.end, canvas, HANDLE_RADIUS) {
                    Some(LineEnd::End)
                } else {
                    None
                };
                if let Some(end) = end {
                    self.open_gesture_history(kind, ActionHint::Connect)?;
                    self.active = ActiveGesture::LineEndpoint {
                        id,
                        end,
                        created_from: None,
                    };
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Dragging out of an anchor creates a new line connected at that
    /// anchor and starts dragging its free end.
    fn begin_line_from_anchor(
        &mut self,
        source: ElementId,
        side: AnchorSide,
        anchor: Point,
    ) -> Result<(), DocumentError> {
        self.open_gesture_history(crate::element::ElementKind::Line, ActionHint::Create)?;
        let mut line = Line::new(anchor, anchor, LineStyle::Direct);
        line.start_connection = Some(ConnectionRef {
            element_id: source,
            anchor: side,
        });
        let id = self.workspace.add(Element::Line(line));
        self.selection.select(id);
        self.events.push(EditorEvent::ElementCreated(id));
        self.active = ActiveGesture::LineEndpoint {
            id,
            end: LineEnd::End,
            created_from: Some(source),
        };
        Ok(())
    }

    fn begin_drag(&mut self, id: ElementId, canvas: Point) -> Result<(), DocumentError> {
        let Some(element) = self.workspace.get(id) else {
            return Ok(());
        };
        // Lines have no transform-based drag; their endpoints move
        // individually through the grips.
        if element.as_line().is_some() {
            return Ok(());
        }
        let kind = element.kind();
        let transform = *element.transform();
        self.open_gesture_history(kind, ActionHint::Move)?;
        self.active = ActiveGesture::Drag {
            id,
            gesture: DragGesture::begin(canvas, transform),
        };
        Ok(())
    }

    fn pointer_move(&mut self, canvas: Point, modifiers: Modifiers) {
        // Resolve the gesture while borrowing `active`, then apply the
        // result against the rest of the editor.
        enum MoveOutcome {
            Transform {
                id: ElementId,
                transform: crate::transform::Transform,
                size: Option<kurbo::Size>,
                started: Option<ActionHint>,
            },
            RotateTo {
                id: ElementId,
                degrees: f64,
                started: bool,
            },
            CropEdge,
            LineEndpoint {
                id: ElementId,
                end: LineEnd,
            },
        }

        let outcome = match &mut self.active {
            ActiveGesture::None => return,
            ActiveGesture::Drag { id, gesture } => match gesture.update(canvas, modifiers) {
                Some(update) => MoveOutcome::Transform {
                    id: *id,
                    transform: update.transform,
                    size: None,
                    started: update.first_move.then_some(ActionHint::Move),
                },
                None => return,
            },
            ActiveGesture::Resize { id, gesture } => {
                let update = gesture.update(canvas, modifiers);
                MoveOutcome::Transform {
                    id: *id,
                    transform: update.transform,
                    size: update.size,
                    started: update.first_move.then_some(ActionHint::Resize),
                }
            }
            ActiveGesture::Rotate { id, gesture } => {
                let started = !gesture.has_moved();
                MoveOutcome::RotateTo {
                    id: *id,
                    degrees: gesture.update(canvas, modifiers),
                    started,
                }
            }
            ActiveGesture::CropEdge => MoveOutcome::CropEdge,
            ActiveGesture::LineEndpoint { id, end, .. } => MoveOutcome::LineEndpoint {
                id: *id,
                end: *end,
            },
        };

        match outcome {
            MoveOutcome::Transform {
                id,
                transform,
                size,
                started,
            } => {
                if let Some(action) = started {
                    self.events.push(EditorEvent::GestureStarted(action));
                }
                if let Some(size) = size {
                    if let Some(element) = self.workspace.get_mut(id) {
                        element.set_local_size(size);
                        self.events.push(EditorEvent::ReflowRequested(id));
                    }
                }
                self.apply_transform(id, transform);
            }
            MoveOutcome::RotateTo {
                id,
                degrees,
                started,
            } => {
                if started {
                    self.events
                        .push(EditorEvent::GestureStarted(ActionHint::Rotate));
                }
                if let Some(element) = self.workspace.get(id) {
                    let rotated = element.transform().rotated(degrees);
                    self.apply_transform(id, rotated);
                }
            }
            MoveOutcome::CropEdge => {
                if let Some((crop_id, session)) = &mut self.crop {
                    if let Some(element) = self.workspace.get(*crop_id) {
                        let local = element.transform().to_local(canvas, element.local_size());
                        session.update(local);
                    }
                }
            }
            MoveOutcome::LineEndpoint { id, end } => {
                self.move_line_endpoint(id, end, canvas);
            }
        }
    }

    fn move_line_endpoint(&mut self, id: ElementId, end: LineEnd, canvas: Point) {
        let snap = router::find_snap_target(&self.workspace, canvas, id);
        let point = match snap {
            Some((target, side)) => self
                .workspace
                .get(target)
                .map(|element| router::anchor_point(element, side))
                .unwrap_or(canvas),
            None => canvas,
        };
        let connection = snap.map(|(target, side)| ConnectionRef {
            element_id: target,
            anchor: side,
        });

        let Some(line) = self.workspace.get_mut(id).and_then(Element::as_line_mut) else {
            return;
        };
        match end {
            LineEnd::Start => {
                line.start = point;
                line.start_connection = connection;
            }
            LineEnd::End => {
                line.end = point;
                line.end_connection = connection;
            }
        }
        self.events.push(EditorEvent::ElementPatched(id));
    }

    fn pointer_up(&mut self) -> Result<(), DocumentError> {
        match std::mem::replace(&mut self.active, ActiveGesture::None) {
            ActiveGesture::None => Ok(()),
            ActiveGesture::CropEdge => {
                // Edge drags only commit when the overlay closes.
                if let Some((_, session)) = &mut self.crop {
                    session.end_edge();
                }
                Ok(())
            }
            ActiveGesture::LineEndpoint {
                id,
                created_from: Some(source),
                ..
            } if self.line_is_degenerate(id) => {
                // An anchor press that never went anywhere: drop the
                // zero-length line and put the selection back.
                self.workspace.remove(id);
                self.events.push(EditorEvent::ElementRemoved(id));
                self.selection.select(source);
                self.history.discard_pending();
                Ok(())
            }
            _ => self.commit_history(),
        }
    }

    /// A line collapsed to a point with its free end unconnected.
    fn line_is_degenerate(&self, id: ElementId) -> bool {
        self.workspace
            .get(id)
            .and_then(Element::as_line)
            .is_some_and(|line| line.start == line.end && line.end_connection.is_none())
    }

    /// Replace an element's transform and refresh any connected lines.
    fn apply_transform(&mut self, id: ElementId, transform: crate::transform::Transform) {
        let Some(element) = self.workspace.get_mut(id) else {
            return;
        };
        element.set_transform(transform);
        self.events.push(EditorEvent::TransformChanged(id));

        let rerouted = router::reroute_for(&mut self.workspace, id);
        if !rerouted.is_empty() {
            self.events.push(EditorEvent::LinesRerouted(rerouted));
        }
    }

    /// Feed a keyboard command.
    pub fn handle_command(&mut self, command: Command) -> Result<(), DocumentError> {
        match command {
            Command::Delete => self.delete_selected(),
            Command::ResetRotation => self.reset_rotation(),
            Command::ToggleCrop => self.toggle_crop(),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        }
    }

    fn delete_selected(&mut self) -> Result<(), DocumentError> {
        let Some(id) = self.selection.current() else {
            return Ok(());
        };
        if self.crop.is_some() {
            self.crop = None;
            self.history.discard_pending();
        }
        let kind = self.workspace.get(id).map(Element::kind);
        let before = self.snapshot_entry(kind, Some(ActionHint::Delete))?;
        self.history.open_pending(before);
        if self.workspace.remove(id).is_some() {
            // Connected lines keep their last endpoint position and fall
            // back to it when routed; the dangling reference is allowed.
            self.selection.clear();
            self.events.push(EditorEvent::ElementRemoved(id));
        }
        self.commit_history()
    }

    fn reset_rotation(&mut self) -> Result<(), DocumentError> {
        let Some(id) = self.selection.current() else {
            return Ok(());
        };
        let Some(element) = self.workspace.get(id) else {
            return Ok(());
        };
        if !element.supports_rotation() || element.transform().rotate_degrees == 0.0 {
            return Ok(());
        }
        let kind = element.kind();
        let reset = element.transform().rotated(0.0);
        let before = self.snapshot_entry(Some(kind), Some(ActionHint::Rotate))?;
        self.history.open_pending(before);
        self.apply_transform(id, reset);
        self.commit_history()
    }

    fn toggle_crop(&mut self) -> Result<(), DocumentError> {
        if self.crop.is_some() {
            return self.commit_crop();
        }
        let Some(id) = self.selection.current() else {
            return Ok(());
        };
        let Some(image) = self.workspace.get(id).and_then(Element::as_image) else {
            return Ok(());
        };
        let session = CropSession::begin(image);
        let before = self.snapshot_entry(
            Some(crate::element::ElementKind::Image),
            Some(ActionHint::Crop),
        )?;
        self.history.open_pending(before);
        self.crop = Some((id, session));
        self.selection.begin_cropping();
        Ok(())
    }

    fn commit_crop(&mut self) -> Result<(), DocumentError> {
        let Some((id, session)) = self.crop.take() else {
            return Ok(());
        };
        self.selection.end_cropping();
        if let Some(image) = self.workspace.get_mut(id).and_then(Element::as_image_mut) {
            image.crop = session.commit();
            self.events.push(EditorEvent::ElementPatched(id));
        }
        self.commit_history()
    }

    /// Encode the selected element for the clipboard.
    pub fn copy_selected(&self) -> Option<String> {
        self.workspace.copy_element(self.selection.current()?)
    }

    /// Paste tagged clipboard text at a screen position.
    pub fn paste(&mut self, text: &str, screen: Point) -> Result<Option<ElementId>, DocumentError> {
        // Moving the selection away closes any open crop overlay.
        self.commit_crop()?;
        let canvas = self.workspace.camera.screen_to_canvas(screen);
        let before = self.snapshot_entry(None, Some(ActionHint::Paste))?;
        let Some(id) = self.workspace.paste(text, canvas) else {
            return Ok(None);
        };
        self.history.open_pending(before);
        self.selection.select(id);
        self.events.push(EditorEvent::ElementCreated(id));
        self.commit_history()?;
        Ok(Some(id))
    }

    pub fn undo(&mut self) -> Result<(), DocumentError> {
        let current = self.workspace.snapshot_json()?;
        if let Some(snapshot) = self.history.undo(current) {
            self.apply_snapshot(&snapshot)?;
        }
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), DocumentError> {
        let current = self.workspace.snapshot_json()?;
        if let Some(snapshot) = self.history.redo(current) {
            self.apply_snapshot(&snapshot)?;
        }
        Ok(())
    }

    /// Serialize the whole document for persistence.
    pub fn save(&self) -> Result<String, DocumentError> {
        self.workspace.to_json()
    }

    /// Replace the document, resetting selection, history, and loads.
    pub fn load(&mut self, text: &str) -> Result<(), DocumentError> {
        self.workspace = Workspace::from_json(text)?;
        self.selection.clear();
        self.selection.take_events();
        self.history.clear();
        self.resources.reset();
        self.active = ActiveGesture::None;
        self.crop = None;
        self.events.push(EditorEvent::DocumentReplaced);
        Ok(())
    }

    /// Register an async resource load for an element.
    pub fn begin_resource_load(&mut self, id: ElementId) -> LoadTicket {
        self.resources.begin_load(id)
    }

    /// Deliver a finished resource load.
    pub fn complete_resource_load(&mut self, ticket: LoadTicket, outcome: ResourceOutcome) {
        let id = ticket.element_id();
        if self.resources.complete(&mut self.workspace, ticket, outcome) {
            self.events.push(EditorEvent::ElementPatched(id));
        }
    }

    /// Restore an elements-only snapshot, patching in place so elements
    /// that survive keep their identity (and any live host resources).
    fn apply_snapshot(&mut self, snapshot: &str) -> Result<(), DocumentError> {
        let new_elements = Workspace::elements_from_snapshot(snapshot)?;

        let old_ids: HashSet<ElementId> = self.workspace.order().iter().copied().collect();
        let new_ids: HashSet<ElementId> = new_elements.iter().map(Element::id).collect();

        for id in &old_ids {
            if !new_ids.contains(id) {
                self.events.push(EditorEvent::ElementRemoved(*id));
            }
        }
        for element in &new_elements {
            let id = element.id();
            if !old_ids.contains(&id) {
                self.events.push(EditorEvent::ElementCreated(id));
            } else if let Some(old) = self.workspace.get(id) {
                let changed =
                    serde_json::to_string(old)? != serde_json::to_string(element)?;
                if changed {
                    self.events.push(EditorEvent::ElementPatched(id));
                }
            }
        }

        if self
            .selection
            .current()
            .is_some_and(|selected| !new_ids.contains(&selected))
        {
            self.selection.clear();
        }

        self.workspace.restore_elements(new_elements);
        Ok(())
    }

    fn open_gesture_history(
        &mut self,
        kind: crate::element::ElementKind,
        action: ActionHint,
    ) -> Result<(), DocumentError> {
        let entry = self.snapshot_entry(Some(kind), Some(action))?;
        self.history.open_pending(entry);
        Ok(())
    }

    fn snapshot_entry(
        &self,
        kind: Option<crate::element::ElementKind>,
        action: Option<ActionHint>,
    ) -> Result<HistoryEntry, DocumentError> {
        Ok(HistoryEntry::with_hints(
            self.workspace.snapshot_json()?,
            kind,
            action,
        ))
    }

    fn commit_history(&mut self) -> Result<(), DocumentError> {
        match self.workspace.snapshot_json() {
            Ok(current) => {
                self.history.commit_pending(&current);
                Ok(())
            }
            Err(err) => {
                warn!("failed to snapshot document for history: {err}");
                self.history.discard_pending();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Image, Note, Sticky};
    use crate::input::{Modifiers, MouseButton, PointerEvent};
    use crate::transform::Transform;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn editor_with_sticky() -> (Editor, ElementId) {
        let mut editor = Editor::new();
        let id = editor
            .insert(Element::Sticky(Sticky::new(Transform::at(0.0, 0.0))))
            .unwrap();
        editor.history.clear();
        editor.take_events();
        (editor, id)
    }

    #[test]
    fn test_click_selects_topmost_and_background_clears() {
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        assert_eq!(editor.selection().current(), Some(id));

        editor.handle_pointer_event(down(5000.0, 5000.0)).unwrap();
        assert_eq!(editor.selection().current(), None);
    }

    #[test]
    fn test_drag_moves_and_undo_restores() {
        // Sticky note at the origin; drag from (0,0) by (50,30).
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(0.0, 0.0)).unwrap();
        editor.handle_pointer_event(mv(50.0, 30.0)).unwrap();
        editor.handle_pointer_event(up(50.0, 30.0)).unwrap();

        let t = editor.workspace.get(id).unwrap().transform();
        assert!((t.translate_x - 50.0).abs() < 1e-9);
        assert!((t.translate_y - 30.0).abs() < 1e-9);

        editor.handle_command(Command::Undo).unwrap();
        let t = editor.workspace.get(id).unwrap().transform();
        assert!(t.translate_x.abs() < 1e-9);
        assert!(t.translate_y.abs() < 1e-9);
        // Identity survives the round trip.
        assert_eq!(editor.workspace.get(id).unwrap().id(), id);
    }

    #[test]
    fn test_undo_redo_restores_drag() {
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(0.0, 0.0)).unwrap();
        editor.handle_pointer_event(mv(50.0, 30.0)).unwrap();
        editor.handle_pointer_event(up(50.0, 30.0)).unwrap();

        editor.handle_command(Command::Undo).unwrap();
        editor.handle_command(Command::Redo).unwrap();

        // The same element is back at the dragged position.
        let element = editor.workspace.get(id).unwrap();
        assert_eq!(element.id(), id);
        assert_eq!(element.kind(), crate::element::ElementKind::Sticky);
        let t = element.transform();
        assert!((t.translate_x - 50.0).abs() < 1e-9);
        assert!((t.translate_y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_noop_click_records_no_history() {
        let (mut editor, _id) = editor_with_sticky();
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_drag_respects_camera() {
        let (mut editor, id) = editor_with_sticky();
        editor.workspace.camera.zoom = 2.0;
        // Screen (20, 20) is canvas (10, 10); moving 100 screen units
        // displaces 50 canvas units.
        editor.handle_pointer_event(down(20.0, 20.0)).unwrap();
        editor.handle_pointer_event(mv(120.0, 20.0)).unwrap();
        editor.handle_pointer_event(up(120.0, 20.0)).unwrap();

        let t = editor.workspace.get(id).unwrap().transform();
        assert!((t.translate_x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_handle_scales_board() {
        let mut editor = Editor::new();
        let id = editor
            .insert(Element::Board(crate::element::Board::new(Transform::at(
                0.0, 0.0,
            ))))
            .unwrap();
        editor.take_events();

        // Select, then grab the resize handle at the bottom-right corner.
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(down(500.0, 200.0)).unwrap();
        editor.handle_pointer_event(mv(600.0, 250.0)).unwrap();
        editor.handle_pointer_event(up(600.0, 250.0)).unwrap();

        let t = editor.workspace.get(id).unwrap().transform();
        assert!((t.scale_x - 1.2).abs() < 1e-9);
        assert!((t.scale_y - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_reflow_resize_emits_event() {
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        // Sticky is 225x150.
        editor.handle_pointer_event(down(225.0, 150.0)).unwrap();
        editor.handle_pointer_event(mv(300.0, 200.0)).unwrap();
        editor.handle_pointer_event(up(300.0, 200.0)).unwrap();

        let size = editor.workspace.get(id).unwrap().local_size();
        assert!((size.width - 300.0).abs() < 1e-9);
        assert!((size.height - 200.0).abs() < 1e-9);
        assert!(
            editor
                .take_events()
                .contains(&EditorEvent::ReflowRequested(id))
        );
    }

    #[test]
    fn test_rotate_handle_and_reset() {
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();

        // Rotate handle sits above the top edge midpoint at (112.5, -25);
        // drag it to the right of the center for a 90° turn.
        editor.handle_pointer_event(down(112.5, -25.0)).unwrap();
        editor.handle_pointer_event(mv(300.0, 75.0)).unwrap();
        editor.handle_pointer_event(up(300.0, 75.0)).unwrap();
        let t = editor.workspace.get(id).unwrap().transform();
        assert!((t.rotate_degrees - 90.0).abs() < 1e-9);

        editor.handle_command(Command::ResetRotation).unwrap();
        let t = editor.workspace.get(id).unwrap().transform();
        assert!(t.rotate_degrees.abs() < 1e-9);

        // Reset is undoable.
        editor.handle_command(Command::Undo).unwrap();
        let t = editor.workspace.get(id).unwrap().transform();
        assert!((t.rotate_degrees - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_drag_creates_connected_line() {
        let (mut editor, sticky) = editor_with_sticky();
        let target = editor
            .insert(Element::Note(Note::new(Transform::at(400.0, 50.0), "t")))
            .unwrap();
        editor.history.clear();
        editor.take_events();

        // Select the sticky, then drag out of its east anchor (225, 75).
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(down(225.0, 75.0)).unwrap();
        // End near the target's west anchor (400, 75) to snap.
        editor.handle_pointer_event(mv(395.0, 78.0)).unwrap();
        editor.handle_pointer_event(up(395.0, 78.0)).unwrap();

        let line_id = editor.selection().current().unwrap();
        let line = editor.workspace.get(line_id).unwrap().as_line().unwrap();
        assert_eq!(
            line.start_connection,
            Some(ConnectionRef {
                element_id: sticky,
                anchor: AnchorSide::East,
            })
        );
        assert_eq!(
            line.end_connection,
            Some(ConnectionRef {
                element_id: target,
                anchor: AnchorSide::West,
            })
        );
        assert_eq!(line.end, Point::new(400.0, 75.0));
    }

    #[test]
    fn test_anchor_click_without_drag_leaves_no_line() {
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();

        let before = editor.workspace.len();
        // Press the east anchor (225, 75) and release without moving.
        editor.handle_pointer_event(down(225.0, 75.0)).unwrap();
        editor.handle_pointer_event(up(225.0, 75.0)).unwrap();

        assert_eq!(editor.workspace.len(), before);
        assert_eq!(editor.selection().current(), Some(id));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_dragging_connected_element_reroutes_line() {
        let (mut editor, sticky) = editor_with_sticky();
        let mut line = Line::new(Point::new(225.0, 75.0), Point::new(500.0, 75.0), LineStyle::Direct);
        line.start_connection = Some(ConnectionRef {
            element_id: sticky,
            anchor: AnchorSide::East,
        });
        let line_id = editor.workspace.add(Element::Line(line));
        editor.take_events();

        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(mv(110.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(110.0, 10.0)).unwrap();

        let line = editor.workspace.get(line_id).unwrap().as_line().unwrap();
        assert!((line.start.x - 325.0).abs() < 1e-9);
        assert!(
            editor
                .take_events()
                .contains(&EditorEvent::LinesRerouted(vec![line_id]))
        );
    }

    #[test]
    fn test_delete_keeps_dangling_line() {
        let (mut editor, sticky) = editor_with_sticky();
        let mut line = Line::new(Point::new(225.0, 75.0), Point::new(500.0, 75.0), LineStyle::Direct);
        line.start_connection = Some(ConnectionRef {
            element_id: sticky,
            anchor: AnchorSide::East,
        });
        let line_id = editor.workspace.add(Element::Line(line));

        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        editor.handle_command(Command::Delete).unwrap();

        assert!(editor.workspace.get(sticky).is_none());
        let line = editor.workspace.get(line_id).unwrap().as_line().unwrap();
        // Routing falls back to the stored endpoint.
        let routed = router::route(&editor.workspace, line);
        assert_eq!(routed.start, Point::new(225.0, 75.0));

        // Deleting is undoable.
        editor.handle_command(Command::Undo).unwrap();
        assert!(editor.workspace.get(sticky).is_some());
    }

    #[test]
    fn test_crop_toggle_commits_rect() {
        let mut editor = Editor::new();
        let id = editor
            .insert(Element::Image(Image::new(
                Transform::at(0.0, 0.0),
                "img.png",
                200.0,
                100.0,
            )))
            .unwrap();
        editor.history.clear();
        editor.take_events();

        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        editor.handle_command(Command::ToggleCrop).unwrap();
        assert_eq!(
            editor.selection().state(),
            crate::selection::SelectionState::Cropping
        );

        // Drag the west edge handle (at local (0, 50)) to x = 40.
        editor.handle_pointer_event(down(0.0, 50.0)).unwrap();
        editor.handle_pointer_event(mv(40.0, 50.0)).unwrap();
        editor.handle_pointer_event(up(40.0, 50.0)).unwrap();
        editor.handle_command(Command::ToggleCrop).unwrap();

        let image = editor.workspace.get(id).unwrap().as_image().unwrap();
        let crop = image.crop.unwrap();
        assert!((crop.x - 40.0).abs() < 1e-9);
        assert!((crop.width - 160.0).abs() < 1e-9);

        // Crop is one undoable step.
        editor.handle_command(Command::Undo).unwrap();
        let image = editor.workspace.get(id).unwrap().as_image().unwrap();
        assert!(image.crop.is_none());
    }

    #[test]
    fn test_insert_while_cropping_commits_crop() {
        let mut editor = Editor::new();
        let image_id = editor
            .insert(Element::Image(Image::new(
                Transform::at(0.0, 0.0),
                "img.png",
                200.0,
                100.0,
            )))
            .unwrap();
        editor.history.clear();
        editor.take_events();

        editor.handle_pointer_event(down(10.0, 10.0)).unwrap();
        editor.handle_pointer_event(up(10.0, 10.0)).unwrap();
        editor.handle_command(Command::ToggleCrop).unwrap();
        editor.handle_pointer_event(down(0.0, 50.0)).unwrap();
        editor.handle_pointer_event(mv(40.0, 50.0)).unwrap();
        editor.handle_pointer_event(up(40.0, 50.0)).unwrap();

        // Inserting while the overlay is open commits the crop first.
        let note_id = editor
            .insert(Element::Note(Note::new(Transform::at(600.0, 0.0), "n")))
            .unwrap();
        let image = editor.workspace.get(image_id).unwrap().as_image().unwrap();
        assert!((image.crop.unwrap().x - 40.0).abs() < 1e-9);
        assert_eq!(
            editor.selection().state(),
            crate::selection::SelectionState::Selected
        );

        // The crop and the insert stay separately undoable.
        editor.handle_command(Command::Undo).unwrap();
        assert!(editor.workspace.get(note_id).is_none());
        editor.handle_command(Command::Undo).unwrap();
        let image = editor.workspace.get(image_id).unwrap().as_image().unwrap();
        assert!(image.crop.is_none());
    }

    #[test]
    fn test_copy_paste_round_trip() {
        let (mut editor, id) = editor_with_sticky();
        editor.selection.select(id);
        let text = editor.copy_selected().unwrap();
        let pasted = editor.paste(&text, Point::new(300.0, 400.0)).unwrap().unwrap();

        assert_ne!(pasted, id);
        let t = editor.workspace.get(pasted).unwrap().transform();
        assert!((t.translate_x - 300.0).abs() < 1e-9);
        assert!((t.translate_y - 400.0).abs() < 1e-9);

        // Paste is undoable.
        editor.handle_command(Command::Undo).unwrap();
        assert!(editor.workspace.get(pasted).is_none());
    }

    #[test]
    fn test_paste_garbage_is_ignored() {
        let (mut editor, _id) = editor_with_sticky();
        assert!(editor.paste("nonsense", Point::ZERO).unwrap().is_none());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_patches_in_place() {
        let (mut editor, id) = editor_with_sticky();
        editor.handle_pointer_event(down(0.0, 0.0)).unwrap();
        editor.handle_pointer_event(mv(50.0, 30.0)).unwrap();
        editor.handle_pointer_event(up(50.0, 30.0)).unwrap();
        editor.take_events();

        editor.handle_command(Command::Undo).unwrap();
        let events = editor.take_events();
        assert!(events.contains(&EditorEvent::ElementPatched(id)));
        assert!(!events.contains(&EditorEvent::ElementRemoved(id)));
        assert!(!events.contains(&EditorEvent::ElementCreated(id)));
    }

    #[test]
    fn test_resource_completion_after_undo_of_delete() {
        let mut editor = Editor::new();
        let id = editor
            .insert(Element::Image(Image::new(
                Transform::default(),
                "img.png",
                100.0,
                80.0,
            )))
            .unwrap();
        let ticket = editor.begin_resource_load(id);

        editor.selection.select(id);
        editor.handle_command(Command::Delete).unwrap();
        editor.complete_resource_load(
            ticket,
            ResourceOutcome::ImageLoaded {
                natural_width: 800.0,
                natural_height: 600.0,
            },
        );
        // The element was gone when the load resolved; nothing to patch.
        editor.handle_command(Command::Undo).unwrap();
        let image = editor.workspace.get(id).unwrap().as_image().unwrap();
        assert!((image.natural_width - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_resets_history_and_selection() {
        let (mut editor, id) = editor_with_sticky();
        editor.selection.select(id);
        editor.handle_pointer_event(down(0.0, 0.0)).unwrap();
        editor.handle_pointer_event(mv(50.0, 0.0)).unwrap();
        editor.handle_pointer_event(up(50.0, 0.0)).unwrap();
        assert!(editor.can_undo());

        let saved = editor.save().unwrap();
        editor.load(&saved).unwrap();
        assert!(!editor.can_undo());
        assert_eq!(editor.selection().current(), None);
        assert!(editor.take_events().contains(&EditorEvent::DocumentReplaced));
    }
}
