//! Persisted key-value cache for client state.
//!
//! A flat string-to-string map that survives restarts, used for the session
//! token and profile. Two implementations:
//!
//! - [`FileCache`] - one JSON object in a file, rewritten on every change
//! - [`MemoryCache`] - process-local, for tests and throwaway sessions
//!
//! There is no locking beyond the process: the last writer wins.
//!
//! [`FileCache`] does synchronous `std::fs` I/O on a file of two short
//! entries, touched only on restore, login and logout. Callers run it inline
//! on the async runtime instead of through `spawn_blocking`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but is not a JSON object of strings.
    #[error("cache file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory map was poisoned by a panicking writer.
    #[error("cache lock poisoned")]
    Poisoned,
}

/// A flat key-value store with string values.
pub trait KeyValueCache: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove a single key.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the backing store cannot be written.
    fn clear(&self) -> Result<(), CacheError>;
}

// =============================================================================
// File Cache
// =============================================================================

/// Cache stored as a single JSON object in a file.
///
/// The parent directory is created on first write. A missing file reads as
/// an empty cache.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Create a cache backed by `path`. Nothing is touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            CacheError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    /// Read the map, treating a corrupt file as empty so writes can recover it.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, CacheError> {
        match self.read_all() {
            Err(CacheError::Corrupt { .. }) => {
                tracing::warn!(path = %self.path.display(), "Overwriting corrupt cache file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.read_for_update()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// =============================================================================
// Memory Cache
// =============================================================================

/// Process-local cache.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the session store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let guard = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut guard = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut guard = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut guard = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        guard.clear();
        Ok(())
    }
}
