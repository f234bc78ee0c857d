//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! [`MapController`](crate::services::MapController).

use axum::{extract::State, Json};

use super::dto::{
    ConfigResponse, HealthResponse, HistogramChart, NavigationState, OpacityRequest, OpacityResponse,
    RefreshRequest, RefreshResponse, SelectDateRequest, StepRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::OverlayOpacity;
use crate::services::Direction;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let controller = &state.controller;
    let time_index = if !controller.settings().temporal_navigation() {
        "disabled"
    } else if controller.navigation().is_some() {
        "ready"
    } else {
        "unavailable"
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source: controller.fetcher().source().locate(""),
        time_index: time_index.to_string(),
    }))
}

// =============================================================================
// Configuration
// =============================================================================

/// GET /v1/config
pub async fn get_config(State(state): State<AppState>) -> HandlerResult<ConfigResponse> {
    let settings = state.controller.settings();
    let opacity = *state.opacity.read();

    Ok(Json(ConfigResponse {
        tiles: state.config.tiles.clone(),
        layers: state.controller.catalogue().iter().cloned().collect(),
        default_layers: settings.default_layers.clone(),
        opacity: opacity.into(),
        temporal_navigation: settings.temporal_navigation(),
        fade: settings.fade_enabled(),
    }))
}

/// PUT /v1/opacity
///
/// Out-of-range values are clamped, never rejected.
pub async fn set_opacity(
    State(state): State<AppState>,
    Json(request): Json<OpacityRequest>,
) -> HandlerResult<OpacityResponse> {
    let opacity = OverlayOpacity::from_percent(request.percent);
    *state.opacity.write() = opacity;
    Ok(Json(opacity.into()))
}

// =============================================================================
// Date Navigation
// =============================================================================

/// GET /v1/dates
///
/// Re-reads the published index so newly published dates are listed.
pub async fn get_dates(State(state): State<AppState>) -> HandlerResult<NavigationState> {
    state
        .controller
        .reload_index()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unavailable("Temporal navigation is disabled".to_string()))
}

/// POST /v1/dates/select
///
/// Unknown keys leave the active key unchanged.
pub async fn select_date(
    State(state): State<AppState>,
    Json(request): Json<SelectDateRequest>,
) -> HandlerResult<NavigationState> {
    Ok(Json(state.controller.select_date(&request.key)?))
}

/// POST /v1/dates/step
pub async fn step_date(
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> HandlerResult<NavigationState> {
    let direction: Direction = request.direction.parse().map_err(AppError::BadRequest)?;
    Ok(Json(state.controller.step(direction)?))
}

// =============================================================================
// Refresh
// =============================================================================

/// POST /v1/refresh
///
/// Runs one refresh cycle. Missing layers are reported in the body, never
/// as an error status.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> HandlerResult<RefreshResponse> {
    let controller = &state.controller;
    let layers = request
        .layers
        .unwrap_or_else(|| controller.settings().default_layers.clone());

    let (report, (scene, tracked)) = controller
        .refresh_with(&layers, |map, tracked| (map.scene(), tracked.to_vec()))
        .await;

    Ok(Json(RefreshResponse {
        message: report.message,
        status: report.status,
        committed: report.committed,
        tracked,
        scene,
    }))
}

// =============================================================================
// Histogram
// =============================================================================

/// GET /v1/histogram
///
/// 404 when no histogram is published, 422 when it is malformed.
pub async fn get_histogram(State(state): State<AppState>) -> HandlerResult<HistogramChart> {
    Ok(Json(state.controller.load_histogram().await?))
}
