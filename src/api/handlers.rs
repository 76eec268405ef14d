//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::PomodoroError,
    state::{AppState, Settings, SettingsUpdate, Theme, ThemeUpdate},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

type ApiResult<T> = Result<Json<T>, PomodoroError>;

/// Handle POST /start - Start a cycle or resume a paused period
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.start().inspect_err(|e| error!("Failed to start timer: {}", e))?;
    Ok(Json(ApiResponse::for_timer("Timer started", timer)))
}

/// Handle POST /pause - Pause the running period
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.pause().inspect_err(|e| error!("Failed to pause timer: {}", e))?;
    Ok(Json(ApiResponse::for_timer("Timer paused", timer)))
}

/// Handle POST /stop - Return to idle
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.stop().inspect_err(|e| error!("Failed to stop timer: {}", e))?;
    Ok(Json(ApiResponse::for_timer("Timer stopped", timer)))
}

/// Handle POST /cue/stop - Silence the current cue
pub async fn stop_cue_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.stop_cue().inspect_err(|e| error!("Failed to silence cue: {}", e))?;
    Ok(Json(ApiResponse::for_timer("Cue silenced", timer)))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let timer = state.status().inspect_err(|e| error!("Failed to get timer status: {}", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /settings - Return current durations
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> ApiResult<Settings> {
    Ok(Json(state.settings()?))
}

/// Handle PUT /settings - Edit durations and repetitions
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> ApiResult<Settings> {
    let Json(update) = payload.map_err(|e| rejected("settings", e))?;

    let settings = state
        .update_settings(&update)
        .inspect_err(|e| warn!("Settings edit rejected: {}", e))?;
    info!("Settings endpoint called - durations updated");
    Ok(Json(settings))
}

/// Handle GET /theme - Return the card theme
pub async fn get_theme_handler(State(state): State<Arc<AppState>>) -> ApiResult<Theme> {
    Ok(Json(state.theme()?))
}

/// Handle PUT /theme - Edit opacity and background image
pub async fn update_theme_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ThemeUpdate>, JsonRejection>,
) -> ApiResult<Theme> {
    let Json(update) = payload.map_err(|e| rejected("theme", e))?;

    let theme = state
        .update_theme(&update)
        .inspect_err(|e| warn!("Theme edit rejected: {}", e))?;
    Ok(Json(theme))
}

/// Handle DELETE /theme/background - Remove the background image
pub async fn clear_background_handler(State(state): State<Arc<AppState>>) -> ApiResult<Theme> {
    Ok(Json(state.clear_background()?))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn rejected(what: &str, rejection: JsonRejection) -> PomodoroError {
    warn!("Malformed {} edit: {}", what, rejection.body_text());
    PomodoroError::invalid(format!("malformed {} edit: {}", what, rejection.body_text()))
}
