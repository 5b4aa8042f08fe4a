//! The workspace: an ordered arena of elements plus the camera.
//!
//! Documents serialize as a JSON array of `{ "type", "data" }` records,
//! ending with a `meta` record that carries the camera state. Unknown
//! record types are skipped with a warning so documents written by newer
//! versions still open; a structurally malformed document is rejected
//! whole rather than partially loaded.

use std::collections::HashMap;

use kurbo::{Point, Vec2};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::camera::Camera;
use crate::element::{Element, ElementId};

/// Prefix marking clipboard text as an element payload.
pub const CLIPBOARD_TAG: &str = "tremolo:";

/// Offset applied to duplicated elements so the copy is visible.
const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document root must be an array of records")]
    NotAnArray,
    #[error("record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct MetaRecord {
    zoom: crate::camera::ZoomMeta,
}

/// All elements on the board, in stacking order, plus the camera.
#[derive(Debug, Default)]
pub struct Workspace {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
    pub camera: Camera,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Insert an element on top of the stack and return its id.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id();
        if self.elements.insert(id, element).is_none() {
            self.order.push(id);
        }
        id
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id);
        if removed.is_some() {
            self.order.retain(|other| *other != id);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
    }

    /// Elements in stacking order, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Ids in stacking order, bottom first.
    pub fn order(&self) -> &[ElementId] {
        &self.order
    }

    /// The topmost element whose shape contains the canvas point.
    pub fn hit_test(&self, canvas_point: Point) -> Option<ElementId> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.elements.get(id))
            .find(|element| element.hit_test(canvas_point))
            .map(|element| element.id())
    }

    /// Clone an element under a fresh id, offset so the copy is visible.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let mut copy = self.elements.get(&id)?.clone();
        copy.regenerate_id();
        offset_element(&mut copy, DUPLICATE_OFFSET);
        Some(self.add(copy))
    }

    /// Serialize the full document, elements then the trailing meta record.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let mut records: Vec<Value> = Vec::with_capacity(self.order.len() + 1);
        for element in self.iter() {
            records.push(serde_json::to_value(element)?);
        }
        records.push(serde_json::json!({
            "type": "meta",
            "data": MetaRecord { zoom: self.camera.meta() },
        }));
        Ok(serde_json::to_string(&records)?)
    }

    /// Parse a full document. Rejects the whole document on structural
    /// errors; skips individual records of unknown type.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let root: Value = serde_json::from_str(text)?;
        let records = root.as_array().ok_or(DocumentError::NotAnArray)?;

        let mut workspace = Workspace::new();
        for (index, record) in records.iter().enumerate() {
            let kind = record
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| DocumentError::MalformedRecord {
                    index,
                    reason: "missing \"type\" tag".to_string(),
                })?;
            if kind == "meta" {
                let meta: MetaRecord = serde_json::from_value(
                    record.get("data").cloned().unwrap_or(Value::Null),
                )
                .map_err(|err| DocumentError::MalformedRecord {
                    index,
                    reason: err.to_string(),
                })?;
                workspace.camera.apply_meta(meta.zoom);
                continue;
            }
            match serde_json::from_value::<Element>(record.clone()) {
                Ok(element) => {
                    workspace.add(element);
                }
                Err(err) if is_unknown_tag(&err) => {
                    warn!("skipping unknown record type {kind:?} at index {index}");
                }
                Err(err) => {
                    return Err(DocumentError::MalformedRecord {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(workspace)
    }

    /// Serialize only the elements, camera excluded. Used for history
    /// snapshots so pan and zoom never pollute undo.
    pub fn snapshot_json(&self) -> Result<String, DocumentError> {
        let records: Vec<&Element> = self.iter().collect();
        Ok(serde_json::to_string(&records)?)
    }

    /// Parse the element list produced by [`Self::snapshot_json`].
    pub fn elements_from_snapshot(text: &str) -> Result<Vec<Element>, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Replace all elements, leaving the camera untouched.
    pub fn restore_elements(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        self.order.clear();
        for element in elements {
            self.add(element);
        }
    }

    /// Encode an element as tagged clipboard text.
    pub fn copy_element(&self, id: ElementId) -> Option<String> {
        let element = self.elements.get(&id)?;
        match serde_json::to_string(element) {
            Ok(json) => Some(format!("{CLIPBOARD_TAG}{json}")),
            Err(err) => {
                warn!("failed to encode clipboard payload: {err}");
                None
            }
        }
    }

    /// Decode tagged clipboard text and insert it at the given canvas
    /// position under a fresh id. Returns `None` (and leaves the
    /// workspace untouched) when the text is not a valid payload.
    pub fn paste(&mut self, text: &str, at: Point) -> Option<ElementId> {
        let payload = text.strip_prefix(CLIPBOARD_TAG)?;
        let mut element: Element = match serde_json::from_str(payload) {
            Ok(element) => element,
            Err(err) => {
                warn!("ignoring malformed clipboard payload: {err}");
                return None;
            }
        };
        element.regenerate_id();
        place_element_at(&mut element, at);
        Some(self.add(element))
    }
}

/// Serde reports an out-of-range adjacent tag as "unknown variant".
fn is_unknown_tag(err: &serde_json::Error) -> bool {
    err.to_string().contains("unknown variant")
}

fn offset_element(element: &mut Element, offset: Vec2) {
    if let Some(line) = element.as_line_mut() {
        line.start += offset;
        line.end += offset;
        line.start_connection = None;
        line.end_connection = None;
    } else {
        let t = *element.transform();
        element.set_transform(t.translated(t.translation() + offset));
    }
}

fn place_element_at(element: &mut Element, at: Point) {
    if let Some(line) = element.as_line_mut() {
        let span = line.end - line.start;
        line.start = at;
        line.end = at + span;
        line.start_connection = None;
        line.end_connection = None;
    } else {
        let t = *element.transform();
        element.set_transform(t.translated(at.to_vec2()));
    }
}
