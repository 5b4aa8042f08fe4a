//! Crop overlay session for images.
//!
//! The session owns a working copy of the crop rectangle in the image's
//! local coordinate space. Edge handles are dragged one at a time; the
//! opposite edge stays fixed and the dragged edge clamps to the image
//! bounds and to a one-unit minimum extent. Nothing is written back to
//! the image until the session is committed.

use kurbo::{Point, Size};

use crate::element::{AnchorSide, CropRect, Image};

/// An open crop overlay on one image.
#[derive(Debug)]
pub struct CropSession {
    rect: CropRect,
    bounds: Size,
    active_edge: Option<AnchorSide>,
    dirty: bool,
}

impl CropSession {
    /// Open a session on an image, starting from its existing crop or,
    /// absent one, the full image bounds.
    pub fn begin(image: &Image) -> Self {
        let bounds = Size::new(image.width, image.height);
        Self {
            rect: image
                .crop
                .unwrap_or_else(|| CropRect::full(bounds.width, bounds.height)),
            bounds,
            active_edge: None,
            dirty: false,
        }
    }

    pub fn rect(&self) -> CropRect {
        self.rect
    }

    /// Start dragging one edge handle.
    pub fn begin_edge(&mut self, edge: AnchorSide) {
        self.active_edge = Some(edge);
    }

    /// Feed a pointer position in the image's local space while an edge
    /// drag is active. The dragged edge clamps so the rect stays inside
    /// the image and at least one unit wide and tall.
    pub fn update(&mut self, local_point: Point) {
        let Some(edge) = self.active_edge else {
            return;
        };
        let right = self.rect.x + self.rect.width;
        let bottom = self.rect.y + self.rect.height;
        match edge {
            AnchorSide::West => {
                let x = local_point.x.clamp(0.0, right - 1.0);
                self.rect.width = right - x;
                self.rect.x = x;
            }
            AnchorSide::East => {
                let new_right = local_point.x.clamp(self.rect.x + 1.0, self.bounds.width);
                self.rect.width = new_right - self.rect.x;
            }
            AnchorSide::North => {
                let y = local_point.y.clamp(0.0, bottom - 1.0);
                self.rect.height = bottom - y;
                self.rect.y = y;
            }
            AnchorSide::South => {
                let new_bottom = local_point.y.clamp(self.rect.y + 1.0, self.bounds.height);
                self.rect.height = new_bottom - self.rect.y;
            }
        }
        self.dirty = true;
    }

    /// Finish the active edge drag, keeping the session open.
    pub fn end_edge(&mut self) {
        self.active_edge = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.active_edge.is_some()
    }

    /// Whether any edge drag changed the rectangle.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Close the session, producing the crop to store on the image.
    /// A rect covering the full image means no crop.
    pub fn commit(self) -> Option<CropRect> {
        let full = CropRect::full(self.bounds.width, self.bounds.height);
        (self.rect != full).then_some(self.rect)
    }
}
