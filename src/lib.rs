//! Countdown Timer - A state-managed HTTP countdown timer
//!
//! This library provides a single countdown with pause/resume, presets,
//! a bounded history of completed runs and persisted user settings. The
//! timer core is driven by a cancellable one-second ticker and reports to
//! pluggable renderer, notifier, sound and storage collaborators.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{TimerError, TimerResult};
pub use state::{AppState, Collaborators};
pub use utils::signals::shutdown_signal;
