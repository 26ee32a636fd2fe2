//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::TimerError,
    services::{Notification, TimerSnapshot},
    state::{Command, HistoryEntry, Settings, TimeFields},
};

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(message: impl Into<String>, timer: TimerSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Body of `PUT /timer/input`. Fields may be numbers or raw text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub hours: Value,
    #[serde(default)]
    pub minutes: Value,
    #[serde(default)]
    pub seconds: Value,
}

/// Result of a key press
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyResponse {
    pub key: String,
    pub command: Option<Command>,
    pub timer: TimerSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub timestamp: DateTime<Utc>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
}

/// Full status including settings and history size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub fields: TimeFields,
    pub settings: Settings,
    pub history_entries: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub last_notification: Option<Notification>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A timer error on its way to the client
#[derive(Debug)]
pub struct ApiError(pub TimerError);

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            TimerError::InvalidDuration | TimerError::MalformedEntry(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TimerError::InvalidOperation(_) => StatusCode::CONFLICT,
            TimerError::UnknownHistoryEntry(_) => StatusCode::NOT_FOUND,
            TimerError::StorageUnavailable(_)
            | TimerError::AudioUnavailable(_)
            | TimerError::StatePoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self.0 {
            TimerError::InvalidDuration => "invalid_duration",
            TimerError::InvalidOperation(_) => "invalid_operation",
            TimerError::MalformedEntry(_) => "malformed_entry",
            TimerError::UnknownHistoryEntry(_) => "unknown_history_entry",
            TimerError::StorageUnavailable(_) => "storage_unavailable",
            TimerError::AudioUnavailable(_) => "audio_unavailable",
            TimerError::StatePoisoned(_) => "state_poisoned",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            error: self.kind().to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
