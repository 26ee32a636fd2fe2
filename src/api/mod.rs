//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/input", put(input_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/preset/:minutes", post(preset_handler))
        .route("/timer/updates", get(updates_handler))
        .route("/history", get(history_handler))
        .route("/history/:index/load", post(history_load_handler))
        .route("/settings/sound", post(sound_toggle_handler))
        .route("/settings/theme", post(theme_toggle_handler))
        .route("/keys/:code", post(key_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
