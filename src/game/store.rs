//! Store - Key-value persistence for numeric sequences
//!
//! The leaderboard only needs `get`/`set` of a list of floats under a key.
//! `JsonFileStore` keeps every key in one JSON object and rewrites the file
//! through a temporary sibling so a crash never leaves a half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Persistence boundary
pub trait KeyValueStore {
    /// Values stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, StoreError>;
    /// Replace the whole value stored under `key`
    fn set(&mut self, key: &str, values: &[f64]) -> Result<(), StoreError>;
}

/// In-memory store, mostly for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<f64>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one key
    pub fn with_entry(key: &str, values: &[f64]) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), values.to_vec());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, values: &[f64]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), values.to_vec());
        Ok(())
    }
}

/// JSON file-backed store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the JSON file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, serde_json::Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, StoreError> {
        let entries = self.read_all()?;
        match entries.get(key) {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    fn set(&mut self, key: &str, values: &[f64]) -> Result<(), StoreError> {
        // Other keys survive a rewrite; an unreadable file is replaced outright.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            log::warn!("replacing unreadable store {}: {}", self.path.display(), e);
            BTreeMap::new()
        });
        entries.insert(key.to_string(), serde_json::to_value(values)?);
        self.write_all(&entries)
    }
}
