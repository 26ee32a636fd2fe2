//! Render model publishing

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::state::{duration, Controls, TimerStatus};

/// Everything a front end needs to draw the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    /// Remaining time as `HH:MM:SS`
    pub display: String,
    pub progress_percent: u8,
    pub status_text: String,
    pub controls: Controls,
}

impl TimerSnapshot {
    pub fn new(remaining: u32, total: u32, status: TimerStatus) -> Self {
        Self {
            status,
            remaining_seconds: remaining,
            total_seconds: total,
            display: duration::format_clock(remaining),
            progress_percent: duration::progress_percent(total, remaining),
            status_text: status.describe().to_string(),
            controls: Controls::for_status(status, total),
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::new(0, 0, TimerStatus::Idle)
    }
}

/// Receives the timer state after every mutation
pub trait Renderer: Send + Sync {
    fn update(&self, remaining: u32, total: u32, status: TimerStatus);

    /// Feed of rendered snapshots, for renderers that publish one
    fn subscribe(&self) -> Option<watch::Receiver<TimerSnapshot>> {
        None
    }
}

/// Publishes snapshots on a watch channel; readers always see the latest one
#[derive(Debug)]
pub struct WatchRenderer {
    tx: watch::Sender<TimerSnapshot>,
}

impl WatchRenderer {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TimerSnapshot::default());
        Self { tx }
    }
}

impl Default for WatchRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for WatchRenderer {
    fn update(&self, remaining: u32, total: u32, status: TimerStatus) {
        // send_replace keeps working when nobody is subscribed
        self.tx.send_replace(TimerSnapshot::new(remaining, total, status));
    }

    fn subscribe(&self) -> Option<watch::Receiver<TimerSnapshot>> {
        Some(self.tx.subscribe())
    }
}
