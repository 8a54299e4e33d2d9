//! SenseCanvas dashboard backend.
//!
//! Wires the components together:
//! - Sensor stream (live WebSocket feed, mock fallback)
//! - Layout, alert and theme stores on local storage
//! - Periodic alert evaluation
//! - HTTP/WebSocket dashboard server

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
