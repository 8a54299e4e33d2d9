//! Real-time dashboard server for SenseCanvas.
//!
//! Serves the live sensor state, layouts, themes and alerts over HTTP, and
//! pushes periodic updates to browser clients over WebSocket.
//!
//! # Endpoints
//!
//! - `GET /api/snapshot`: current state snapshot
//! - `GET /api/history`: recent sensor samples
//! - `GET /api/sensors/value?path=`: single value by dotted path
//! - `GET /health`: stream status, client count and history length
//! - `GET /api/layout`, `GET /api/layout/export`, `POST /api/layout/import`
//! - `/api/layout/widgets[/{id}[/position]]`: add, patch, place and remove widgets
//! - `/api/layouts[/{id}[/load]]`: save, list, load and delete saved layouts
//! - `GET|PUT /api/themes`, `POST /api/themes/toggle`
//! - `/api/alerts[/{id}]`: list, add, patch and remove alert conditions
//! - `POST /api/alerts/history/{id}/ack`, `DELETE /api/alerts/history`
//! - `POST /api/ai-layout`: layout suggestions
//! - `GET /ws`: snapshot on connect, then `update` and `alert` messages

pub mod broadcast;
pub mod config;
mod edit;
pub mod server;
pub mod state;
pub mod suggestions;
pub mod types;

pub use config::DashboardConfig;
pub use server::{create_router, run_server, serve, AppState, ConnectionLimiter};
pub use state::DashboardState;
pub use suggestions::suggest_layouts;
pub use types::{DashboardMessage, DashboardSnapshot, LayoutSuggestion, SensorUpdate};
