//! Structured logging for SenseCanvas.
//!
//! JSON output in production, pretty output during development.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
