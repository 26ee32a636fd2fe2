//! User-facing notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error => warn!("Notification: {}", message),
            NotificationKind::Success | NotificationKind::Info => {
                info!("Notification: {}", message)
            }
        }
    }
}
