//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream error: {0}")]
    Stream(#[from] sensecanvas_stream::StreamError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sensecanvas_telemetry::TelemetryError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
