//! Resize gesture from the bottom-right handle.
//!
//! Scale-mode elements get new scale factors derived from the pointer
//! displacement; reflow-mode elements get new local width/height so text
//! re-wraps. Aspect locking defaults per element kind and is inverted by
//! shift for the duration of the move.

use kurbo::{Point, Size, Vec2};

use super::snap_to_grid;
use crate::element::{Element, ResizeMode};
use crate::input::Modifiers;
use crate::transform::{MIN_SCALE, Transform};

/// Result of a resize move.
#[derive(Debug, Clone, Copy)]
pub struct ResizeUpdate {
    pub transform: Transform,
    /// New local size for reflow-mode elements, `None` for scale mode.
    pub size: Option<Size>,
    pub first_move: bool,
}

/// An in-flight resize of one element.
#[derive(Debug)]
pub struct ResizeGesture {
    mode: ResizeMode,
    start: Transform,
    /// Local size at gesture start, scale factors baked in for reflow.
    start_size: Size,
    start_pointer: Point,
    moved: bool,
}

impl ResizeGesture {
    pub fn begin(element: &Element, pointer: Point) -> Self {
        let mode = element.resize_mode();
        let transform = *element.transform();
        let local = element.local_size();
        let start_size = match mode {
            // Reflow bakes the scale into the size and resets the scale,
            // so the content re-wraps at its on-screen dimensions.
            ResizeMode::Reflow => Size::new(
                local.width * transform.scale_x,
                local.height * transform.scale_y,
            ),
            ResizeMode::Scale { .. } => local,
        };
        Self {
            mode,
            start: transform,
            start_size,
            start_pointer: pointer,
            moved: false,
        }
    }

    /// Feed a pointer move, producing the replacement transform (and, for
    /// reflow elements, the replacement local size).
    pub fn update(&mut self, pointer: Point, modifiers: Modifiers) -> ResizeUpdate {
        let delta = pointer - self.start_pointer;
        let first_move = !self.moved;
        self.moved = true;

        match self.mode {
            ResizeMode::Scale { aspect_locked } => {
                let update = self.scale_update(delta, aspect_locked, modifiers);
                ResizeUpdate {
                    transform: update,
                    size: None,
                    first_move,
                }
            }
            ResizeMode::Reflow => {
                let size = self.reflow_size(delta, modifiers);
                ResizeUpdate {
                    transform: Transform {
                        scale_x: 1.0,
                        scale_y: 1.0,
                        ..self.start
                    },
                    size: Some(size),
                    first_move,
                }
            }
        }
    }

    fn scale_update(&self, delta: Vec2, aspect_locked: bool, modifiers: Modifiers) -> Transform {
        let Size { width, height } = self.start_size;
        let mut scale_x = ((width * self.start.scale_x + delta.x) / width).max(MIN_SCALE);
        let mut scale_y = ((height * self.start.scale_y + delta.y) / height).max(MIN_SCALE);

        // Shift inverts the element's default aspect behavior.
        if aspect_locked != modifiers.shift {
            let ratio = scale_x.max(scale_y);
            scale_x = ratio;
            scale_y = ratio;
        }

        if modifiers.ctrl {
            scale_x = (snap_to_grid(width * scale_x) / width).max(MIN_SCALE);
            scale_y = (snap_to_grid(height * scale_y) / height).max(MIN_SCALE);
        }

        self.start.scaled(scale_x, scale_y)
    }

    fn reflow_size(&self, delta: Vec2, modifiers: Modifiers) -> Size {
        let mut width = (self.start_size.width + delta.x).max(1.0);
        let mut height = (self.start_size.height + delta.y).max(1.0);

        if modifiers.shift {
            // Preserve the starting aspect ratio, following the wider growth.
            let ratio = (width / self.start_size.width).max(height / self.start_size.height);
            width = (self.start_size.width * ratio).max(1.0);
            height = (self.start_size.height * ratio).max(1.0);
        }

        if modifiers.ctrl {
            width = snap_to_grid(width).max(1.0);
            height = snap_to_grid(height).max(1.0);
        }

        Size::new(width, height)
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }
}
