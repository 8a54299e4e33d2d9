//! Core domain types for the SenseCanvas hardware dashboard.
//!
//! This crate provides the types shared by every other SenseCanvas crate:
//! - `SensorData`: Flat snapshot of CPU/GPU/memory/storage/fan telemetry
//! - `HardwareComponent`: Vendor hardware-sensor records as sent upstream
//! - `WidgetConfig`, `DashboardLayout`: Widgets placed on a snapping grid
//! - `AlertCondition`, `Alert`: Threshold alerts on sensor paths
//! - `Theme`: Built-in color palettes

pub mod alert;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod sensor;
pub mod theme;

pub use alert::{Alert, AlertCondition, AlertConditionPatch, AlertOperator};
pub use error::{CoreError, Result};
pub use geometry::{clamp_grid_size, snap_to_grid, Position, Rect, Size};
pub use layout::{
    Appearance, Borders, ChartParams, DashboardLayout, Typography, WidgetConfig, WidgetPatch,
    WidgetType, DEFAULT_GRID_SIZE, DEFAULT_LAYOUT_ID, DEFAULT_THEME_ID,
};
pub use sensor::{
    lookup_path, CoreData, CpuData, GpuData, HardwareComponent, MemoryData, MotherboardData,
    NetworkData, SensorData, SensorReading, StorageDevice,
};
pub use theme::{builtin_themes, is_known_theme, theme, Theme, ThemeColors};

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh unique identifier for layouts, widgets, alerts.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
