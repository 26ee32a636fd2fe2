//! Completion sound

use std::io::Write;

use crate::error::{TimerError, TimerResult};

pub trait SoundPlayer: Send + Sync {
    fn play(&self) -> TimerResult<()>;
}

/// Rings the terminal bell on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&self) -> TimerResult<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| TimerError::AudioUnavailable(e.to_string()))
    }
}
