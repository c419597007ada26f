//! Key/value storage media for the session record.
//!
//! A backend plays the role of browser local storage: string keys, string
//! values, and any operation may fail when the medium is blocked or full.

use crate::GateError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// String key/value storage that may be unavailable.
pub trait StorageBackend: Send + Sync {
    /// Load the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, GateError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), GateError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), GateError>;
}

/// In-process storage. Lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, GateError> {
        self.entries
            .lock()
            .map_err(|_| GateError::StorageIO("memory backend lock poisoned".to_string()))
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GateError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// File-based backend with atomic writes.
///
/// Stores one `<key>.json` file per key under `dirs::data_dir()/<namespace>/`.
/// Uses temp file + rename so a reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a file backend with the given namespace.
    pub fn new(namespace: &str) -> Result<Self, GateError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| GateError::StorageIO("Could not find data directory".to_string()))?;

        Self::with_path(base_dir.join(namespace))
    }

    /// Create a file backend rooted at a specific directory.
    pub fn with_path(dir: PathBuf) -> Result<Self, GateError> {
        fs::create_dir_all(&dir)
            .map_err(|e| GateError::StorageIO(format!("Failed to create storage dir: {}", e)))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str, extension: &str) -> Result<PathBuf, GateError> {
        Ok(self.dir.join(format!("{}.{}", checked_key(key)?, extension)))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        let path = self.key_path(key, "json")?;

        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| GateError::StorageIO(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        let target_path = self.key_path(key, "json")?;
        let temp_path = self.key_path(key, "tmp")?;

        fs::write(&temp_path, value)
            .map_err(|e| GateError::StorageIO(format!("Failed to write temp file: {}", e)))?;

        fs::rename(&temp_path, &target_path)
            .map_err(|e| GateError::StorageIO(format!("Failed to rename storage file: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GateError> {
        let path = self.key_path(key, "json")?;

        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| GateError::StorageIO(format!("Failed to delete: {}", e)))?;
        }

        Ok(())
    }
}

/// Keys map one-to-one onto file names, so only `[A-Za-z0-9_-]` is allowed.
fn checked_key(key: &str) -> Result<&str, GateError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(key)
    } else {
        Err(GateError::StorageIO(format!("Invalid storage key: {:?}", key)))
    }
}
