//! Snapshot-based undo/redo history.
//!
//! Each entry is a full serialized snapshot of the element list. Gestures
//! open a pending entry at pointer-down and commit it at pointer-up; a
//! gesture that ends with the document byte-identical to how it started
//! commits nothing, so clicks and aborted drags never pollute the stack.

use crate::element::ElementKind;

/// Maximum retained undo depth; the oldest entries fall off.
pub const MAX_HISTORY: usize = 50;

/// What kind of edit produced an entry, for host UI labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionHint {
    Create,
    Move,
    Resize,
    Rotate,
    Crop,
    Delete,
    Edit,
    Paste,
    Connect,
}

/// One undoable document state.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Serialized element list, camera excluded.
    pub snapshot: String,
    pub kind_hint: Option<ElementKind>,
    pub action_hint: Option<ActionHint>,
}

impl HistoryEntry {
    pub fn new(snapshot: String) -> Self {
        Self {
            snapshot,
            kind_hint: None,
            action_hint: None,
        }
    }

    pub fn with_hints(
        snapshot: String,
        kind: Option<ElementKind>,
        action: Option<ActionHint>,
    ) -> Self {
        Self {
            snapshot,
            kind_hint: kind,
            action_hint: action,
        }
    }
}

/// Undo/redo stacks plus the pending entry opened by an in-flight gesture.
#[derive(Debug, Default)]
pub struct History {
    past: Vec<HistoryEntry>,
    future: Vec<HistoryEntry>,
    pending: Option<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Record a completed edit. A snapshot identical to the top of the
    /// undo stack is dropped; any recorded edit clears the redo stack.
    pub fn push_entry(&mut self, entry: HistoryEntry) {
        if self.past.last().is_some_and(|top| top.snapshot == entry.snapshot) {
            return;
        }
        self.past.push(entry);
        self.future.clear();
        if self.past.len() > MAX_HISTORY {
            self.past.remove(0);
        }
    }

    /// Capture the pre-gesture state. Replaces any previously open
    /// pending entry.
    pub fn open_pending(&mut self, entry: HistoryEntry) {
        self.pending = Some(entry);
    }

    /// Commit the pending entry if the document actually changed during
    /// the gesture. Returns true when an entry was recorded.
    pub fn commit_pending(&mut self, current_snapshot: &str) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.snapshot == current_snapshot {
            return false;
        }
        self.push_entry(pending);
        true
    }

    /// Drop the pending entry without recording it.
    pub fn discard_pending(&mut self) {
        self.pending = None;
    }

    /// Step back one entry. The current state moves onto the redo stack;
    /// the returned snapshot is the state to restore.
    pub fn undo(&mut self, current_snapshot: String) -> Option<String> {
        let entry = self.past.pop()?;
        self.future.push(HistoryEntry::with_hints(
            current_snapshot,
            entry.kind_hint,
            entry.action_hint,
        ));
        Some(entry.snapshot)
    }

    /// Step forward one entry previously undone.
    pub fn redo(&mut self, current_snapshot: String) -> Option<String> {
        let entry = self.future.pop()?;
        self.past.push(HistoryEntry::with_hints(
            current_snapshot,
            entry.kind_hint,
            entry.action_hint,
        ));
        Some(entry.snapshot)
    }

    /// Forget everything, e.g. after loading a different document.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.pending = None;
    }
}
