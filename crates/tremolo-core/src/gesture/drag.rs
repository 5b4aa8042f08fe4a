//! Drag gesture: moves an element by replacing its translation.

use kurbo::{Point, Vec2};

use super::snap_to_grid;
use crate::input::Modifiers;
use crate::transform::Transform;

/// Result of a drag move: the replacement transform for the element.
#[derive(Debug, Clone, Copy)]
pub struct DragUpdate {
    pub transform: Transform,
    /// True on the first move that actually displaces the element,
    /// letting the editor open a history entry lazily.
    pub first_move: bool,
}

/// An in-flight drag of one element.
///
/// The grab offset between the pointer and the element's translation is
/// captured at pointer-down and held constant, so the element tracks the
/// pointer without jumping regardless of where in the element it was
/// grabbed.
#[derive(Debug)]
pub struct DragGesture {
    start: Transform,
    offset: Vec2,
    last: Vec2,
    moved: bool,
}

impl DragGesture {
    pub fn begin(pointer: Point, transform: Transform) -> Self {
        Self {
            start: transform,
            offset: pointer.to_vec2() - transform.translation(),
            last: transform.translation(),
            moved: false,
        }
    }

    /// Feed a pointer move. Returns `None` when the resulting translation
    /// is unchanged from the last update.
    pub fn update(&mut self, pointer: Point, modifiers: Modifiers) -> Option<DragUpdate> {
        let mut target = pointer.to_vec2() - self.offset;

        if modifiers.shift {
            // Lock to the dominant axis of the total displacement. Sampled
            // per move, so the lock can flip while shift is held.
            let displacement = target - self.start.translation();
            if displacement.x.abs() >= displacement.y.abs() {
                target.y = self.start.translate_y;
            } else {
                target.x = self.start.translate_x;
            }
        }

        if modifiers.ctrl {
            target = Vec2::new(snap_to_grid(target.x), snap_to_grid(target.y));
        }

        if target == self.last {
            return None;
        }
        self.last = target;

        let first_move = !self.moved;
        self.moved = true;
        Some(DragUpdate {
            transform: self.start.translated(target),
            first_move,
        })
    }

    /// Whether any update actually displaced the element.
    pub fn has_moved(&self) -> bool {
        self.moved
    }
}
