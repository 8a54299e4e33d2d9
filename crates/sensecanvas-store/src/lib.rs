//! Local persistent storage for SenseCanvas.
//!
//! Mirrors dashboard state to a key/value store under fixed keys:
//! - `LayoutStore`: current layout, saved layouts, editor selection
//! - `AlertStore`: alert conditions and fired-alert history
//! - `ThemeStore`: selected theme
//!
//! Storage failures are logged and never surfaced; the in-memory state
//! stays authoritative.

pub mod alert_store;
pub mod error;
pub mod layout_store;
pub mod storage;
pub mod theme_store;

pub use alert_store::{AlertStore, ALERT_HISTORY_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use layout_store::LayoutStore;
pub use storage::{load_json, save_json, FileStorage, KeyValueStore, MemoryStorage};
pub use theme_store::ThemeStore;
