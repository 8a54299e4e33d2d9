//! Key/value storage backends.
//!
//! Values are JSON text under fixed string keys. Callers go through
//! [`load_json`] / [`save_json`], which log failures and carry on with
//! defaults.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Current layout.
pub const LAYOUT_KEY: &str = "sensecanvas-layout";
/// Saved layouts list.
pub const SAVED_LAYOUTS_KEY: &str = "sensecanvas-saved-layouts";
/// Current layout, older format.
pub const LEGACY_CURRENT_LAYOUT_KEY: &str = "sensecanvas-current-layout";
/// Saved layouts list, older format.
pub const LEGACY_LAYOUTS_KEY: &str = "sensecanvas-layouts";
pub const THEME_KEY: &str = "sensecanvas-theme";
pub const ALERTS_KEY: &str = "sensecanvas-alerts";
pub const ALERT_HISTORY_KEY: &str = "sensecanvas-alert-history";

/// Every key the application writes or reads.
pub const ALL_KEYS: [&str; 7] = [
    LAYOUT_KEY,
    SAVED_LAYOUTS_KEY,
    LEGACY_CURRENT_LAYOUT_KEY,
    LEGACY_LAYOUTS_KEY,
    THEME_KEY,
    ALERTS_KEY,
    ALERT_HISTORY_KEY,
];

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// False when the backend cannot persist anything.
    fn is_available(&self) -> bool;
}

/// One file per key under a data directory.
///
/// Writes go to a temp file that is then renamed over the target, so a
/// reader never sees a half-written value.
pub struct FileStorage {
    dir: PathBuf,
    available: bool,
}

impl FileStorage {
    /// Open (creating if needed) a data directory.
    ///
    /// If the directory cannot be created the storage is unavailable and
    /// every call is a no-op.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let available = match fs::create_dir_all(&dir) {
            Ok(()) => {
                info!(dir = %dir.display(), "Opened file storage");
                true
            }
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "Storage directory unavailable");
                false
            }
        };
        Self { dir, available }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if !self.available {
            debug!(key, "Storage unavailable, skipping read");
            return Ok(None);
        }
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if !self.available {
            debug!(key, "Storage unavailable, skipping write");
            return Ok(());
        }
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(key, bytes = value.len(), "Persisted value");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        if !self.available {
            return Ok(());
        }
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// In-process map.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Read and decode a JSON value. Missing, unreadable or malformed entries
/// are logged and yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read from storage");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Failed to decode stored value");
            None
        }
    }
}

/// Encode and write a JSON value. Failures are logged; returns whether
/// the value was written.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    if !store.is_available() {
        return false;
    }

    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode value for storage");
            return false;
        }
    };

    match store.set(key, &encoded) {
        Ok(()) => true,
        Err(e) => {
            warn!(key, error = %e, "Failed to persist value");
            false
        }
    }
}
