//! Periodic auto-save of the open board.

use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key under which the most recently saved board is mirrored, for
/// restore-on-launch.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

/// Board id used when none was assigned yet.
pub const DEFAULT_DOCUMENT_ID: &str = "untitled";

/// Drives periodic persistence of the open board.
///
/// The host marks the manager dirty whenever the document changes and
/// polls [`AutoSaveManager::maybe_save`] from its tick; saves happen at
/// most once per interval and only when dirty.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    current_board_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            current_board_id: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the board as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_board_id(&mut self, id: Option<String>) {
        self.current_board_id = id;
    }

    pub fn board_id(&self) -> Option<&str> {
        self.current_board_id.as_deref()
    }

    /// Whether the board is dirty and the interval has elapsed.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if needed; returns true when a save was performed.
    pub async fn maybe_save(&mut self, document: &str) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(document).await?;
        Ok(true)
    }

    /// Save immediately, ignoring the interval.
    pub async fn save(&mut self, document: &str) -> StorageResult<()> {
        let board_id = self
            .current_board_id
            .clone()
            .unwrap_or_else(|| DEFAULT_DOCUMENT_ID.to_string());

        self.storage.save(&board_id, document).await?;
        // Mirror as the "last board" for restore on next launch.
        self.storage.save(LAST_DOCUMENT_KEY, document).await?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        Ok(())
    }

    /// Load a board by id.
    pub async fn load(&mut self, id: &str) -> StorageResult<String> {
        let document = self.storage.load(id).await?;
        self.current_board_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(document)
    }

    /// Load the most recently saved board, if any.
    pub async fn load_last(&mut self) -> Option<String> {
        match self.storage.load(LAST_DOCUMENT_KEY).await {
            Ok(document) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(document)
            }
            Err(_) => None,
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// List saved board ids, hiding the last-board mirror.
    pub async fn list_boards(&self) -> StorageResult<Vec<String>> {
        let mut boards = self.storage.list().await?;
        boards.retain(|id| id != LAST_DOCUMENT_KEY);
        Ok(boards)
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create the default filesystem storage backend.
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Create an auto-save manager over the default storage.
pub fn create_autosave_manager() -> StorageResult<AutoSaveManager<crate::storage::FileStorage>> {
    Ok(AutoSaveManager::new(create_default_storage()?))
}
