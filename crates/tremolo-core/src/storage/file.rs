//! File-based storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::fs;
use std::path::PathBuf;

/// Filesystem storage keeping each board as a JSON file.
pub struct FileStorage {
    /// Base directory for board files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at the given directory, creating it
    /// if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/tremolo/boards/`
    /// On Windows: `%APPDATA%\tremolo\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("could not determine home directory".to_string()))?;
        Self::new(base.join("tremolo").join("boards"))
    }

    /// The file path for a board id.
    fn board_path(&self, id: &str) -> PathBuf {
        // Sanitize the id so it is safe as a filename.
        let safe_id: String = id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.board_path(id);
        let document = document.to_string();
        Box::pin(async move {
            fs::write(&path, document)
                .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<String>> {
        let path = self.board_path(id);
        let id_owned = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id_owned));
            }
            fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.board_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("failed to read directory: {e}")))?;

            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                        ids.push(name.to_string());
                    }
                }
            }
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.board_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}
