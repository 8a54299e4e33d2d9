//! Sensor stream error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Connection closed: code={code}, reason={reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("Payload parse error: {0}")]
    ParseError(String),

    #[error("Gave up after {0} reconnection attempts")]
    ReconnectExhausted(u32),

    #[error("Tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type StreamResult<T> = Result<T, StreamError>;
