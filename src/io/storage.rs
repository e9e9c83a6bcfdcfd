use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::{debug, warn};

use crate::io::recovery::atomic_write;
use crate::model::project::ProjectList;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize project list: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// String key-value storage, read and written one whole value at a time.
pub trait Storage {
    /// Value stored under `key`, or `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// File-backed storage: key `k` lives in `<dir>/<k>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes())
            .map_err(|e| StorageError::WriteError { path, source: e })?;
        debug!("event=storage_write key={} bytes={}", key, value.len());
        Ok(())
    }
}

/// In-memory storage, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    /// Number of successful `set` calls
    pub writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one raw value
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Where a loaded project list came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    /// Parsed from storage
    Stored,
    /// Key absent; the seed list was used
    Seed,
    /// Value present but unparseable; the seed list was used
    Malformed { raw: String, reason: String },
    /// Parsed from storage, but `count` tasks had no id and got a fresh one
    IdsAssigned { count: usize },
}

impl ListSource {
    /// Whether the in-memory list differs from what storage holds, so ids
    /// handed out now would not survive a reload.
    pub fn is_unsaved(&self) -> bool {
        !matches!(self, ListSource::Stored)
    }
}

/// Read the project list stored under `key`.
///
/// A missing key and a malformed value both fall back to the seed list; the
/// returned `ListSource` tells the caller which case happened.
pub fn read_project_list(
    storage: &dyn Storage,
    key: &str,
) -> Result<(ProjectList, ListSource), StorageError> {
    let raw = match storage.get(key)? {
        Some(raw) => raw,
        None => return Ok((ProjectList::seed(), ListSource::Seed)),
    };
    match serde_json::from_str::<ProjectList>(&raw) {
        Ok(list) => match count_missing_ids(&raw) {
            0 => Ok((list, ListSource::Stored)),
            count => {
                debug!("event=storage_ids_assigned key={} count={}", key, count);
                Ok((list, ListSource::IdsAssigned { count }))
            }
        },
        Err(e) => {
            warn!(
                "event=storage_malformed key={} bytes={} error={}",
                key,
                raw.len(),
                e
            );
            let reason = e.to_string();
            Ok((ProjectList::seed(), ListSource::Malformed { raw, reason }))
        }
    }
}

/// Tasks in `raw` written without an `id` field
fn count_missing_ids(raw: &str) -> usize {
    let Ok(serde_json::Value::Array(projects)) = serde_json::from_str(raw) else {
        return 0;
    };
    projects
        .iter()
        .filter_map(|p| p.get("tasks").and_then(|t| t.as_array()))
        .flatten()
        .filter(|t| t.get("id").is_none())
        .count()
}

/// Serialize and store the whole project list under `key`.
pub fn write_project_list(
    storage: &mut dyn Storage,
    key: &str,
    list: &ProjectList,
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(list)?;
    storage.set(key, &json)
}
