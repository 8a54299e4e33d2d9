//! HTTP server implementation using axum.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use sensecanvas_core::WidgetType;
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::edit;
use crate::state::DashboardState;
use crate::suggestions::suggest_layouts;
use crate::types::{
    AlertsResponse, DashboardMessage, ErrorResponse, HealthResponse, SensorValue,
    SuggestionsResponse, ThemesResponse,
};

/// Connection limiter to prevent too many concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Reserve a slot; the slot is released when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard {
                    limiter: self.clone(),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dashboard_state: DashboardState,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
    config: DashboardConfig,
}

impl AppState {
    pub fn new(
        dashboard_state: DashboardState,
        broadcast_tx: broadcast::Sender<String>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            dashboard_state,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            config,
        }
    }

    pub(crate) fn dashboard(&self) -> &DashboardState {
        &self.dashboard_state
    }
}

fn cors_layer(config: &DashboardConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/health", get(health))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/history", get(get_history))
        .route("/api/sensors/value", get(get_sensor_value))
        // Current layout and its widgets
        .route("/api/layout", get(get_layout).post(edit::create_layout))
        .route("/api/layout/export", get(export_layout))
        .route("/api/layout/import", post(import_layout))
        .route("/api/layout/reset", post(edit::reset_layout))
        .route("/api/layout/grid", put(edit::set_grid_size))
        .route("/api/layout/widgets", post(edit::add_widget))
        .route(
            "/api/layout/widgets/{id}",
            patch(edit::update_widget).delete(edit::remove_widget),
        )
        .route("/api/layout/widgets/{id}/position", put(edit::place_widget))
        // Saved layouts
        .route(
            "/api/layouts",
            get(edit::list_layouts).post(edit::save_layout),
        )
        .route("/api/layouts/{id}", delete(edit::delete_layout))
        .route("/api/layouts/{id}/load", post(edit::load_layout))
        // Themes
        .route("/api/themes", get(get_themes).put(edit::set_theme))
        .route("/api/themes/toggle", post(edit::toggle_theme))
        // Alerts
        .route("/api/alerts", get(get_alerts).post(edit::add_alert))
        .route(
            "/api/alerts/{id}",
            patch(edit::update_alert).delete(edit::remove_alert),
        )
        .route("/api/alerts/history", delete(edit::clear_alert_history))
        .route("/api/alerts/history/{id}/ack", post(edit::acknowledge_alert))
        .route("/api/ai-layout", post(ai_layout))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let hub = state.dashboard_state.hub();
    Json(HealthResponse {
        status: "healthy",
        stream_status: hub.status(),
        connected_clients: state.connection_limiter.current_count(),
        history_len: hub.history_len(),
    })
}

/// Get current state snapshot as JSON.
async fn get_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard_state.collect_snapshot())
}

async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard_state.hub().history())
}

#[derive(Debug, Deserialize)]
struct ValueQuery {
    path: String,
}

async fn get_sensor_value(
    State(state): State<AppState>,
    Query(query): Query<ValueQuery>,
) -> impl IntoResponse {
    let value = state.dashboard_state.hub().value(&query.path);
    Json(SensorValue {
        path: query.path,
        value,
    })
}

async fn get_layout(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard_state.layouts().current())
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    id: Option<String>,
}

async fn export_layout(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Response {
    match state.dashboard_state.layouts().export_layout(query.id.as_deref()) {
        Some(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("layout not found")),
        )
            .into_response(),
    }
}

async fn import_layout(State(state): State<AppState>, body: String) -> Response {
    let layouts = state.dashboard_state.layouts();
    if layouts.import_layout(&body) {
        Json(layouts.current()).into_response()
    } else {
        bad_request("invalid layout: expected an object with a widgets array")
    }
}

async fn get_themes(State(state): State<AppState>) -> impl IntoResponse {
    Json(ThemesResponse {
        current: state.dashboard_state.themes().current_id(),
        themes: sensecanvas_core::builtin_themes(),
    })
}

async fn get_alerts(State(state): State<AppState>) -> impl IntoResponse {
    let alerts = state.dashboard_state.alerts();
    Json(AlertsResponse {
        conditions: alerts.conditions(),
        history: alerts.history(),
    })
}

/// Validate `{ "layout": [object, ...], "availableWidgets"?: [type, ...] }`.
fn parse_ai_layout_request(body: &str) -> Result<Vec<WidgetType>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| format!("invalid JSON: {e}"))?;
    let layout = value
        .get("layout")
        .and_then(Value::as_array)
        .ok_or_else(|| "layout must be an array".to_string())?;
    if !layout.iter().all(Value::is_object) {
        return Err("layout entries must be objects".to_string());
    }

    // Unknown widget type names are skipped.
    let available = value
        .get("availableWidgets")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(|t| serde_json::from_value::<WidgetType>(t.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    Ok(available)
}

/// Layout suggestions from the built-in catalog.
async fn ai_layout(body: String) -> Response {
    match parse_ai_layout_request(&body) {
        Ok(available) => {
            let suggestions = suggest_layouts(&available);
            debug!(count = suggestions.len(), "Serving layout suggestions");
            Json(SuggestionsResponse { suggestions }).into_response()
        }
        Err(reason) => {
            debug!(%reason, "Rejected layout suggestion request");
            bad_request(reason)
        }
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Check connection limit
    let guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!(
                current = state.connection_limiter.current_count(),
                max = state.config.max_connections,
                "WebSocket connection limit reached"
            );
            return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
        }
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

/// Handle a WebSocket connection.
async fn handle_ws_connection(socket: WebSocket, state: AppState, _guard: ConnectionGuard) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot so no update is missed.
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    // Send initial snapshot
    let initial_msg = DashboardMessage::Snapshot(state.dashboard_state.collect_snapshot());
    if let Ok(json) = serde_json::to_string(&initial_msg) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("Failed to send initial snapshot, client disconnected");
            return;
        }
    }

    // Spawn task to handle incoming messages (for close)
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                // Pong is handled automatically by axum
                _ => {}
            }
        }
    });

    // Main loop: forward broadcast messages to WebSocket
    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send message, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
        }
    }

    incoming_task.abort();
    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Serve on an already-bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    dashboard_state: DashboardState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    // Buffer for slow clients: 32 messages.
    let (broadcast_tx, _) = broadcast::channel::<String>(32);

    let state = AppState::new(dashboard_state.clone(), broadcast_tx.clone(), config.clone());
    let app = create_router(state);

    // Spawn broadcaster task
    let broadcaster_shutdown = shutdown.clone();
    tokio::spawn(async move {
        crate::broadcast::run_broadcaster(
            dashboard_state,
            broadcast_tx,
            config.update_interval_ms,
            broadcaster_shutdown,
        )
        .await;
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

/// Run the dashboard HTTP server.
pub async fn run_server(
    dashboard_state: DashboardState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(port = config.port, "Starting dashboard server");

    let listener = TcpListener::bind(addr).await?;
    serve(listener, dashboard_state, config, shutdown).await?;

    info!("Dashboard server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use sensecanvas_core::{AlertCondition, AlertOperator, SensorData};
    use sensecanvas_store::{AlertStore, LayoutStore, MemoryStorage, ThemeStore};
    use sensecanvas_stream::SensorHub;
    use tower::ServiceExt;

    fn setup_state() -> DashboardState {
        let storage = Arc::new(MemoryStorage::new());
        let hub = Arc::new(SensorHub::default());
        let mut data = SensorData::default();
        data.cpu.usage = 42.5;
        data.fans.insert("CPU Fan".to_string(), 1300.0);
        hub.publish(data);

        DashboardState::new(
            hub,
            Arc::new(LayoutStore::open(storage.clone())),
            Arc::new(AlertStore::open(storage.clone())),
            Arc::new(ThemeStore::open(storage)),
        )
    }

    fn app(state: DashboardState) -> Router {
        let (tx, _) = broadcast::channel(4);
        create_router(AppState::new(state, tx, DashboardConfig::default()))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn snapshot_returns_json() {
        let (status, json) = get_json(app(setup_state()), "/api/snapshot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sensors"]["cpu"]["usage"], 42.5);
        assert_eq!(json["status"], "disconnected");
        assert_eq!(json["historyLen"], 1);
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["layoutId"], "default");
    }

    #[tokio::test]
    async fn health_reports_stream_state() {
        let (status, json) = get_json(app(setup_state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["streamStatus"], "disconnected");
        assert_eq!(json["connectedClients"], 0);
        assert_eq!(json["historyLen"], 1);
    }

    #[tokio::test]
    async fn history_and_value_lookup() {
        let state = setup_state();
        let (status, json) = get_json(app(state.clone()), "/api/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (status, json) =
            get_json(app(state.clone()), "/api/sensors/value?path=fans.CPU%20Fan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["path"], "fans.CPU Fan");
        assert_eq!(json["value"], 1300.0);

        let (_, json) = get_json(app(state.clone()), "/api/sensors/value?path=nope.nothing").await;
        assert_eq!(json["value"], 0.0);

        let (status, _) = get_json(app(state), "/api/sensors/value").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn layout_export_and_import() {
        let state = setup_state();
        let (status, layout) = get_json(app(state.clone()), "/api/layout").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(layout["widgets"].as_array().unwrap().len(), 5);

        let (status, exported) = get_json(app(state.clone()), "/api/layout/export").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exported["id"], "default");

        let (status, _) = get_json(app(state.clone()), "/api/layout/export?id=missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, imported) = post_json(
            app(state.clone()),
            "/api/layout/import",
            r#"{"name": "Mine", "widgets": [{"id": "w"}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(imported["name"], "Mine");
        assert_ne!(imported["id"], "default");

        let (status, json) =
            post_json(app(state.clone()), "/api/layout/import", r#"{"name": "x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(state.layouts().current().name, "Mine");
    }

    #[tokio::test]
    async fn themes_and_alerts() {
        let state = setup_state();
        state.alerts().add_condition(AlertCondition::new(
            "Busy CPU",
            "cpu.usage",
            AlertOperator::Greater,
            40.0,
            "%",
        ));
        state.alerts().check(&state.hub().latest());

        let (status, themes) = get_json(app(state.clone()), "/api/themes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(themes["current"], "dark");
        assert_eq!(themes["themes"].as_array().unwrap().len(), 5);

        let (status, alerts) = get_json(app(state), "/api/alerts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(alerts["conditions"].as_array().unwrap().len(), 1);
        assert_eq!(alerts["history"][0]["condition"], "Busy CPU");
    }

    #[tokio::test]
    async fn ai_layout_validates_body() {
        let state = setup_state();
        let (status, json) = post_json(app(state.clone()), "/api/ai-layout", r#"{"layout": []}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["suggestions"].as_array().unwrap().len(), 3);

        let (status, json) = post_json(
            app(state.clone()),
            "/api/ai-layout",
            r#"{"layout": [{}], "availableWidgets": ["simple"]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["suggestions"][0]["id"], "minimal-overview");

        for body in [
            "not json",
            "{}",
            r#"{"layout": {}}"#,
            r#"{"layout": [1, 2]}"#,
        ] {
            let (status, json) = post_json(app(state.clone()), "/api/ai-layout", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn cors_allows_dev_origin() {
        let response = app(setup_state())
            .oneshot(
                Request::builder()
                    .uri("/api/snapshot")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5173"))
        );

        let response = app(setup_state())
            .oneshot(
                Request::builder()
                    .uri("/api/snapshot")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn connection_limiter_releases_on_drop() {
        let limiter = Arc::new(ConnectionLimiter::new(2));
        let a = limiter.try_acquire().unwrap();
        let _b = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.current_count(), 2);

        drop(a);
        assert_eq!(limiter.current_count(), 1);
        assert!(limiter.try_acquire().is_some());
    }
}
