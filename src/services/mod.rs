//! External collaborator module
//!
//! This module contains the interfaces the timer core talks to (rendering,
//! notifications, sound, persistence) and their implementations.

pub mod notifier;
pub mod renderer;
pub mod sound;
pub mod storage;

// Re-export main types
pub use notifier::{LogNotifier, Notification, NotificationKind, Notifier};
pub use renderer::{Renderer, TimerSnapshot, WatchRenderer};
pub use sound::{SoundPlayer, TerminalBell};
pub use storage::{FileStorage, MemoryStorage, Storage};
