//! Application configuration.

use crate::error::{AppError, AppResult};
use sensecanvas_dashboard::DashboardConfig;
use sensecanvas_stream::{StreamConfig, StreamMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Used when neither `--config` nor `SENSECANVAS_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Upstream sensor stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSection {
    #[serde(default = "default_stream_url")]
    pub url: String,
    /// `live`, `mock` or `auto`.
    #[serde(default)]
    pub mode: StreamMode,
    /// Initial reconnect delay (ms). Default: 1000.
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Reconnect delay cap (ms). Default: 30000.
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    /// 0 = retry forever.
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Minimum spacing between accepted live updates (ms). Default: 1000.
    #[serde(default = "default_min_update_interval_ms")]
    pub min_update_interval_ms: u64,
    /// Mock generator tick (ms). Default: 2000.
    #[serde(default = "default_mock_interval_ms")]
    pub mock_interval_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_stream_url() -> String {
    "ws://localhost:8000/sensors".to_string()
}

fn default_reconnect_base_delay_ms() -> u64 {
    1_000
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

fn default_min_update_interval_ms() -> u64 {
    1_000
}

fn default_mock_interval_ms() -> u64 {
    2_000
}

fn default_history_capacity() -> usize {
    100
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            mode: StreamMode::default(),
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            max_reconnect_attempts: 0,
            min_update_interval_ms: default_min_update_interval_ms(),
            mock_interval_ms: default_mock_interval_ms(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl From<StreamSection> for StreamConfig {
    fn from(section: StreamSection) -> Self {
        Self {
            url: section.url,
            mode: section.mode,
            reconnect_base_delay_ms: section.reconnect_base_delay_ms,
            reconnect_max_delay_ms: section.reconnect_max_delay_ms,
            max_reconnect_attempts: section.max_reconnect_attempts,
            min_update_interval_ms: section.min_update_interval_ms,
            mock_interval_ms: section.mock_interval_ms,
            history_capacity: section.history_capacity,
        }
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Directory holding one JSON file per key. Empty keeps everything in
    /// memory for the lifetime of the process.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageSection {
    pub fn is_in_memory(&self) -> bool {
        self.data_dir.trim().is_empty()
    }
}

/// Alert evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsSection {
    /// Check interval (ms). Default: 5000.
    #[serde(default = "default_alert_check_interval_ms")]
    pub check_interval_ms: u64,
}

fn default_alert_check_interval_ms() -> u64 {
    5_000
}

impl Default for AlertsSection {
    fn default() -> Self {
        Self {
            check_interval_ms: default_alert_check_interval_ms(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stream: StreamSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub alerts: AlertsSection,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn stream_config(&self) -> StreamConfig {
        self.stream.clone().into()
    }
}
