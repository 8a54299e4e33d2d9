//! Current theme selection.

use crate::storage::{KeyValueStore, THEME_KEY};
use parking_lot::RwLock;
use sensecanvas_core::{is_known_theme, theme, Theme, DEFAULT_THEME_ID};
use std::sync::Arc;
use tracing::{debug, warn};

/// Persists the selected theme id as plain text.
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<String>,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            current: RwLock::new(DEFAULT_THEME_ID.to_string()),
        }
    }

    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.init();
        store
    }

    /// Load the stored theme id; unknown ids are ignored.
    pub fn init(&self) {
        let stored = match self.storage.get(THEME_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read theme");
                None
            }
        };

        if let Some(raw) = stored {
            let id = raw.trim().trim_matches('"');
            if is_known_theme(id) {
                *self.current.write() = id.to_string();
            } else {
                warn!(theme = id, "Ignoring unknown stored theme");
            }
        }
    }

    pub fn current_id(&self) -> String {
        self.current.read().clone()
    }

    pub fn current(&self) -> Theme {
        theme(&self.current.read())
    }

    /// Switch theme. Unknown ids are rejected.
    pub fn set_theme(&self, id: &str) -> bool {
        if !is_known_theme(id) {
            warn!(theme = id, "Unknown theme");
            return false;
        }
        let mut current = self.current.write();
        *current = id.to_string();
        if let Err(e) = self.storage.set(THEME_KEY, id) {
            warn!(error = %e, "Failed to persist theme");
        }
        debug!(theme = id, "Theme applied");
        true
    }

    /// Switch between dark and light; any other theme goes to dark.
    pub fn toggle(&self) -> String {
        let next = if self.current_id() == "dark" {
            "light"
        } else {
            "dark"
        };
        self.set_theme(next);
        next.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults_to_dark() {
        let store = ThemeStore::open(Arc::new(MemoryStorage::new()));
        assert_eq!(store.current_id(), "dark");
        assert_eq!(store.current().id, "dark");
    }

    #[test]
    fn test_loads_stored_theme_and_ignores_unknown() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, "gaming").unwrap();
        assert_eq!(ThemeStore::open(storage.clone()).current_id(), "gaming");

        storage.set(THEME_KEY, "neon-pink").unwrap();
        assert_eq!(ThemeStore::open(storage).current_id(), "dark");
    }

    #[test]
    fn test_set_and_toggle_persist() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ThemeStore::open(storage.clone());

        assert!(store.set_theme("minimal"));
        assert!(!store.set_theme("nope"));
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("minimal"));

        assert_eq!(store.toggle(), "dark");
        assert_eq!(store.toggle(), "light");
        assert_eq!(store.toggle(), "dark");
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }
}
