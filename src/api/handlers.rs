//! HTTP endpoint handlers

use std::{sync::Arc, time::Duration};
use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{debug, info};

use crate::state::{duration, AppState};
use super::responses::{
    ApiError, ApiResponse, HealthResponse, HistoryResponse, InputRequest, KeyResponse,
    SettingsResponse, StatusResponse,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// How long GET /timer/updates waits for the next render
const UPDATE_WAIT: Duration = Duration::from_secs(30);

/// Handle PUT /timer/input - Replace the hours/minutes/seconds fields
pub async fn input_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InputRequest>,
) -> ApiResult<ApiResponse> {
    let timer = state.set_fields(
        duration::field_from_json(&request.hours),
        duration::field_from_json(&request.minutes),
        duration::field_from_json(&request.seconds),
    )?;
    Ok(Json(ApiResponse::new("Time updated", timer)))
}

/// Handle POST /timer/start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.start()?;
    info!("Start endpoint called");
    Ok(Json(ApiResponse::new(timer.status_text.clone(), timer)))
}

/// Handle POST /timer/pause - Pause a running countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.pause()?;
    info!("Pause endpoint called");
    Ok(Json(ApiResponse::new(timer.status_text.clone(), timer)))
}

/// Handle POST /timer/reset - Return to a clean idle timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let timer = state.reset()?;
    info!("Reset endpoint called");
    Ok(Json(ApiResponse::new(timer.status_text.clone(), timer)))
}

/// Handle POST /timer/preset/:minutes - Configure a preset duration
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(minutes): Path<i64>,
) -> ApiResult<ApiResponse> {
    let timer = state.set_preset(minutes)?;
    Ok(Json(ApiResponse::new(
        format!("Preset set to {} minutes", timer.total_seconds / 60),
        timer,
    )))
}

/// Handle GET /timer/updates - Wait for the next rendered snapshot.
///
/// Answers with the latest render as soon as it changes, or after
/// `UPDATE_WAIT` with whatever is shown at that point.
pub async fn updates_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let Some(mut display) = state.watch_display() else {
        let timer = state.get_snapshot()?;
        return Ok(Json(ApiResponse::new(timer.status_text.clone(), timer)));
    };

    if tokio::time::timeout(UPDATE_WAIT, display.changed()).await.is_err() {
        debug!("No render within {:?}", UPDATE_WAIT);
    }
    let timer = display.borrow_and_update().clone();
    Ok(Json(ApiResponse::new(timer.status_text.clone(), timer)))
}

/// Handle GET /history - List completed runs, most recent first
pub async fn history_handler(State(state): State<Arc<AppState>>) -> ApiResult<HistoryResponse> {
    Ok(Json(HistoryResponse {
        entries: state.get_history()?,
    }))
}

/// Handle POST /history/:index/load - Configure the timer from a past run
pub async fn history_load_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<ApiResponse> {
    let timer = state.load_from_history(index)?;
    Ok(Json(ApiResponse::new("Loaded from history", timer)))
}

/// Handle POST /settings/sound - Mute or unmute the completion sound
pub async fn sound_toggle_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<SettingsResponse> {
    let settings = state.toggle_sound()?;
    Ok(Json(SettingsResponse {
        timestamp: chrono::Utc::now(),
        settings,
    }))
}

/// Handle POST /settings/theme - Switch between light and dark theme
pub async fn theme_toggle_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<SettingsResponse> {
    let settings = state.toggle_theme()?;
    Ok(Json(SettingsResponse {
        timestamp: chrono::Utc::now(),
        settings,
    }))
}

/// Handle POST /keys/:code - Forward a key press (Space, KeyR)
pub async fn key_handler(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<KeyResponse> {
    let (command, timer) = match state.handle_key(&code)? {
        Some((command, timer)) => (Some(command), timer),
        None => (None, state.get_snapshot()?),
    };
    Ok(Json(KeyResponse { key: code, command, timer }))
}

/// Handle GET /status - Return timer, settings and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: state.get_display()?,
        fields: state.get_fields()?,
        settings: state.get_settings()?,
        history_entries: state.get_history()?.len(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
        last_notification: state.get_last_notification(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
