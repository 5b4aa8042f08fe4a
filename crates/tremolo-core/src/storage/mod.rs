//! Storage abstraction for board persistence.
//!
//! Backends persist serialized board documents (the JSON produced by the
//! workspace serializer) keyed by a board id.

mod autosave;
mod file;
mod memory;

pub use autosave::{
    AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, DEFAULT_DOCUMENT_ID, LAST_DOCUMENT_KEY,
    create_autosave_manager, create_default_storage,
};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("board not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A document storage backend.
///
/// Implementations can keep boards in memory, on the filesystem, or
/// behind a remote service.
pub trait Storage: Send + Sync {
    /// Persist a serialized board document.
    fn save(&self, id: &str, document: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a serialized board document.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<String>>;

    /// Delete a board.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all board ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check whether a board exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
