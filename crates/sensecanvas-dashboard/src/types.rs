//! Dashboard API types.
//!
//! These types are used for JSON serialization in REST and WebSocket APIs.

use sensecanvas_core::{
    Alert, AlertCondition, AlertOperator, Position, SensorData, Size, Theme, WidgetConfig,
};
use sensecanvas_stream::ConnectionStatus;
use serde::{Deserialize, Serialize};

/// Full dashboard state snapshot (sent on initial connection and via REST).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Timestamp when snapshot was taken (Unix milliseconds).
    pub timestamp_ms: i64,
    /// Upstream stream status.
    pub status: ConnectionStatus,
    /// Latest sensor readings.
    pub sensors: SensorData,
    /// Samples currently held in history.
    pub history_len: usize,
    /// Selected theme id.
    pub theme: String,
    /// Id of the current layout.
    pub layout_id: String,
    pub unacknowledged_alerts: usize,
}

/// Periodic sensor update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorUpdate {
    pub timestamp_ms: i64,
    pub status: ConnectionStatus,
    pub sensors: SensorData,
}

/// WebSocket message types (tagged enum for type safety).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage {
    /// Full snapshot (sent on connect).
    Snapshot(DashboardSnapshot),
    /// Periodic update.
    Update(SensorUpdate),
    /// Alert fired since the last update.
    Alert(Alert),
}

/// Single sensor value lookup.
#[derive(Debug, Clone, Serialize)]
pub struct SensorValue {
    pub path: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemesResponse {
    pub current: String,
    pub themes: Vec<Theme>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertsResponse {
    pub conditions: Vec<AlertCondition>,
    /// Newest first.
    pub history: Vec<Alert>,
}

/// Suggested layout from the built-in catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSuggestion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reasoning: String,
    pub confidence: f64,
    pub widgets: Vec<WidgetConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<LayoutSuggestion>,
}

/// `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub stream_status: ConnectionStatus,
    pub connected_clients: usize,
    pub history_len: usize,
}

/// Body of `POST /api/alerts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlertCondition {
    pub name: String,
    pub sensor_path: String,
    pub operator: AlertOperator,
    pub threshold: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl NewAlertCondition {
    pub fn into_condition(self) -> AlertCondition {
        let mut condition = AlertCondition::new(
            self.name,
            self.sensor_path,
            self.operator,
            self.threshold,
            self.unit,
        );
        condition.enabled = self.enabled;
        condition
    }
}

/// Body of `PUT /api/layout/widgets/{id}/position`.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetPlacement {
    pub position: Position,
    pub size: Size,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementResponse {
    /// True if the widget did not exist and was created.
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSize {
    pub grid_size: f64,
}

/// Body of `POST /api/layout` and `POST /api/layouts`.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedLayout {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /api/themes`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSelection {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
