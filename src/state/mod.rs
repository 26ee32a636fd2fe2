//! State management module
//!
//! This module contains the countdown state machine, its derived views, the
//! history ledger, user settings and the controller that ties them together.

pub mod app_state;
pub mod controls;
pub mod duration;
pub mod history;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, Collaborators};
pub use controls::{Command, Controls, Shortcut};
pub use duration::TimeFields;
pub use history::{HistoryEntry, HistoryLedger, HISTORY_CAPACITY};
pub use settings::Settings;
pub use timer_state::{TimerState, TimerStatus, Transition};
