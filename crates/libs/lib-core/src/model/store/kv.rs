//! # Key/Value Backends
//!
//! Durable string-keyed storage, the equivalent of a browser's local storage.
//! [`MemoryStore`] lives for the process; [`FileStore`] persists to a single
//! JSON object file and survives restarts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// String-keyed storage backend.
///
/// Storage is modeled as synchronous; callers treat every failure as
/// advisory.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored, in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

/// Store backed by one JSON object file.
///
/// The file is loaded once on open and rewritten on every mutation through a
/// temporary file and a rename, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file opens empty. A file that is not a JSON object of strings
    /// also opens empty, with a warning; it is replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Storage file is corrupt, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Internal(format!("failed to encode store: {}", e)))?;
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Apply `change` and flush; the in-memory map is restored if the flush fails.
    fn mutate(&self, key: &str, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut entries = self.entries.write();
        let previous = entries.get(key).cloned();

        change(&mut *entries);

        if let Err(e) = self.flush(&*entries) {
            match previous {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            };
            return Err(e);
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.entries.read().contains_key(key) {
            return Ok(());
        }
        self.mutate(key, |entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
