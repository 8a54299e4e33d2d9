//! Error types for sensecanvas-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Duplicate widget id: {0}")]
    DuplicateWidget(String),

    #[error("Widget not found: {0}")]
    WidgetNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
