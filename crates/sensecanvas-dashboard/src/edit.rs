//! Handlers that change layouts, alert conditions and the theme.
//!
//! Every change goes through the stores, which persist it before the
//! handler answers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use sensecanvas_core::{AlertConditionPatch, WidgetConfig, WidgetPatch};
use tracing::info;

use crate::server::AppState;
use crate::types::{
    CreatedResponse, ErrorResponse, GridSize, NamedLayout, NewAlertCondition,
    PlacementResponse, ThemeSelection, WidgetPlacement,
};

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn not_found(what: &str, id: &str) -> Response {
    error(StatusCode::NOT_FOUND, format!("{what} not found: {id}"))
}

fn require_name(name: &str) -> Result<(), Response> {
    if name.trim().is_empty() {
        Err(error(StatusCode::BAD_REQUEST, "name must not be empty"))
    } else {
        Ok(())
    }
}

// ---- widgets ----

pub(crate) async fn add_widget(
    State(state): State<AppState>,
    Json(widget): Json<WidgetConfig>,
) -> Response {
    if widget.id.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "widget id must not be empty");
    }
    match state.dashboard().layouts().add_widget(widget.clone()) {
        Ok(()) => (StatusCode::CREATED, Json(widget)).into_response(),
        Err(e) => error(StatusCode::CONFLICT, e.to_string()),
    }
}

pub(crate) async fn update_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<WidgetPatch>,
) -> Response {
    let layouts = state.dashboard().layouts();
    if !layouts.update_widget(&id, patch) {
        return not_found("widget", &id);
    }
    match layouts.widget(&id) {
        Some(widget) => Json(widget).into_response(),
        None => not_found("widget", &id),
    }
}

pub(crate) async fn place_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(placement): Json<WidgetPlacement>,
) -> Response {
    let created = state
        .dashboard()
        .layouts()
        .upsert_widget_position(&id, placement.position, placement.size);
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(PlacementResponse { created })).into_response()
}

pub(crate) async fn remove_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    if state.dashboard().layouts().remove_widget(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("widget", &id)
    }
}

pub(crate) async fn set_grid_size(
    State(state): State<AppState>,
    Json(request): Json<GridSize>,
) -> Response {
    let grid_size = state.dashboard().layouts().set_grid_size(request.grid_size);
    Json(GridSize { grid_size }).into_response()
}

// ---- layouts ----

/// Start a new empty layout and make it current.
pub(crate) async fn create_layout(
    State(state): State<AppState>,
    Json(request): Json<NamedLayout>,
) -> Response {
    if let Err(response) = require_name(&request.name) {
        return response;
    }
    let layout = state
        .dashboard()
        .layouts()
        .create_layout(&request.name, &request.description);
    (StatusCode::CREATED, Json(layout)).into_response()
}

pub(crate) async fn reset_layout(State(state): State<AppState>) -> Response {
    let layouts = state.dashboard().layouts();
    layouts.reset_layout();
    Json(layouts.current()).into_response()
}

pub(crate) async fn list_layouts(State(state): State<AppState>) -> Response {
    Json(state.dashboard().layouts().saved_layouts()).into_response()
}

/// Snapshot the current layout into the saved list.
pub(crate) async fn save_layout(
    State(state): State<AppState>,
    Json(request): Json<NamedLayout>,
) -> Response {
    if let Err(response) = require_name(&request.name) {
        return response;
    }
    let id = state.dashboard().layouts().save_layout(&request.name);
    (StatusCode::CREATED, Json(CreatedResponse { id })).into_response()
}

pub(crate) async fn load_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let layouts = state.dashboard().layouts();
    if layouts.load_layout(&id) {
        Json(layouts.current()).into_response()
    } else {
        not_found("layout", &id)
    }
}

pub(crate) async fn delete_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    if state.dashboard().layouts().delete_layout(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("layout", &id)
    }
}

// ---- alerts ----

pub(crate) async fn add_alert(
    State(state): State<AppState>,
    Json(request): Json<NewAlertCondition>,
) -> Response {
    if let Err(response) = require_name(&request.name) {
        return response;
    }
    if request.sensor_path.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "sensorPath must not be empty");
    }
    let id = state
        .dashboard()
        .alerts()
        .add_condition(request.into_condition());
    info!(condition_id = %id, "Alert condition added");
    (StatusCode::CREATED, Json(CreatedResponse { id })).into_response()
}

pub(crate) async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AlertConditionPatch>,
) -> Response {
    if state.dashboard().alerts().update_condition(&id, patch) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("alert condition", &id)
    }
}

pub(crate) async fn remove_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    if state.dashboard().alerts().remove_condition(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("alert condition", &id)
    }
}

pub(crate) async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    if state.dashboard().alerts().acknowledge(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("alert", &id)
    }
}

pub(crate) async fn clear_alert_history(State(state): State<AppState>) -> Response {
    state.dashboard().alerts().clear_history();
    StatusCode::NO_CONTENT.into_response()
}

// ---- theme ----

/// Select a theme. The current layout records the same id.
pub(crate) async fn set_theme(
    State(state): State<AppState>,
    Json(request): Json<ThemeSelection>,
) -> Response {
    let dashboard = state.dashboard();
    if !dashboard.themes().set_theme(&request.id) {
        return error(
            StatusCode::BAD_REQUEST,
            format!("unknown theme: {}", request.id),
        );
    }
    dashboard.layouts().set_theme(&request.id);
    Json(dashboard.themes().current()).into_response()
}

pub(crate) async fn toggle_theme(State(state): State<AppState>) -> Response {
    let dashboard = state.dashboard();
    let id = dashboard.themes().toggle();
    dashboard.layouts().set_theme(&id);
    Json(dashboard.themes().current()).into_response()
}
