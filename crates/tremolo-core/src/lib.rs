//! Tremolo Core Library
//!
//! Interactive scene engine for the Tremolo infinite-canvas board:
//! element model, gestures, connection routing, history, and persistence.

pub mod camera;
pub mod editor;
pub mod element;
pub mod gesture;
pub mod history;
pub mod input;
pub mod resource;
pub mod router;
pub mod selection;
pub mod storage;
pub mod transform;
pub mod workspace;

pub use camera::{Camera, ZoomMeta};
pub use editor::{Editor, EditorEvent, HANDLE_RADIUS};
pub use element::{AnchorSide, Element, ElementId, ElementKind, ResizeMode};
pub use gesture::{CropSession, DragGesture, GRID_SIZE, ResizeGesture, RotateGesture};
pub use history::{ActionHint, History, HistoryEntry, MAX_HISTORY};
pub use input::{Command, Modifiers, MouseButton, PointerEvent};
pub use resource::{LoadTicket, ResourceOutcome, ResourceTracker};
pub use router::{CONTROL_OFFSET, LinePath, SNAP_RADIUS, route};
pub use selection::{SelectionManager, SelectionState};
pub use transform::{MIN_SCALE, Transform};
pub use workspace::{CLIPBOARD_TAG, DocumentError, Workspace};
