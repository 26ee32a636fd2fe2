//! Error types shared by the timer core and its collaborators

use thiserror::Error;

/// Every failure the timer can report. None of them is fatal: callers
/// recover by leaving the timer in its previous state or by falling back
/// to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Start was requested while the configured duration is zero
    #[error("please set a valid time")]
    InvalidDuration,

    /// Command is not allowed in the current timer state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A formatted duration could not be parsed back into fields
    #[error("malformed history entry: {0}")]
    MalformedEntry(String),

    /// No history entry at the requested position
    #[error("no history entry at index {0}")]
    UnknownHistoryEntry(usize),

    /// Persistence read or write failed
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Completion sound could not be played
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    /// A lock guarding shared state was poisoned by a panicking holder
    #[error("state lock poisoned: {0}")]
    StatePoisoned(String),
}

pub type TimerResult<T> = Result<T, TimerError>;

impl<T> From<std::sync::PoisonError<T>> for TimerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TimerError::StatePoisoned(e.to_string())
    }
}
