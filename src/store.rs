//! Durable key-value store abstraction and implementations.
//!
//! A [`DurableStore`] is a string-keyed, string-valued mapping owned by the
//! host environment. Cells never reach for an ambient global; the store is
//! injected by reference into every operation that touches it, so tests can
//! substitute [`MemoryStore`] and native processes can use [`FileStore`].
//!
//! The store is a shared resource across independent cells. Each cell
//! assumes exclusive ownership of the keys it is given; collision detection
//! between writers of the same key is the caller's responsibility.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CellError, Result};

/// A durable string-keyed, string-valued mapping.
///
/// All operations are synchronous and single-attempt: a failure propagates
/// to the caller from the failing call, with no retry.
pub trait DurableStore {
    /// Read the entry for `key`, if present.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any existing entry.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove the entry for `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store with process lifetime.
///
/// The substitutable fake for tests, and a real store for state that only
/// needs to outlive individual cells, not the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// On-disk image of a [`FileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileStoreImage {
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// File-backed store surviving process restarts.
///
/// The entries are imaged as pretty-printed JSON in a single file. Every
/// write rewrites the image using the write-to-temp-then-rename pattern to
/// prevent corruption.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, reading any existing image.
    ///
    /// An absent file yields an empty store; the file is created on the
    /// first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            debug!(path = %path.display(), "no store image found, starting empty");
            return Ok(Self {
                path,
                entries: HashMap::new(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let image: FileStoreImage =
            serde_json::from_str(&content).map_err(|e| CellError::StoreUnavailable {
                operation: "open",
                key: String::new(),
                message: format!("corrupt store image at {}: {}", path.display(), e),
            })?;

        debug!(path = %path.display(), entries = image.entries.len(), "opened store image");
        Ok(Self {
            path,
            entries: image.entries,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Whether an entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let image = FileStoreImage {
            entries: self.entries.clone(),
        };
        let content =
            serde_json::to_string_pretty(&image).map_err(|e| CellError::StoreUnavailable {
                operation: "flush",
                key: String::new(),
                message: e.to_string(),
            })?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush().map_err(|e| CellError::StoreUnavailable {
            operation: "set",
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush().map_err(|e| CellError::StoreUnavailable {
            operation: "remove",
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}
