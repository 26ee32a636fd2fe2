//! Enabled commands and keyboard shortcuts

use serde::{Deserialize, Serialize};

use super::TimerStatus;

/// Which timer commands are currently available to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub reset: bool,
}

impl Controls {
    /// Derive the enabled commands from the timer status and configured total
    pub fn for_status(status: TimerStatus, total_time: u32) -> Self {
        match status {
            TimerStatus::Running => Self {
                start: false,
                pause: true,
                reset: true,
            },
            TimerStatus::Paused => Self {
                start: true,
                pause: false,
                reset: true,
            },
            TimerStatus::Idle | TimerStatus::Completed => Self {
                start: true,
                pause: false,
                reset: total_time > 0,
            },
        }
    }
}

/// Keyboard shortcuts understood by the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Space: start when possible, otherwise pause
    StartOrPause,
    /// R: reset
    Reset,
}

/// Command a shortcut resolves to once the enabled controls are known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Pause,
    Reset,
}

impl Shortcut {
    /// Map a DOM-style key code (`Space`, `KeyR`) to a shortcut
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(Self::StartOrPause),
            "KeyR" => Some(Self::Reset),
            _ => None,
        }
    }

    /// Pick the command this shortcut triggers, if any control allows it
    pub fn resolve(self, controls: Controls) -> Option<Command> {
        match self {
            Self::StartOrPause if controls.start => Some(Command::Start),
            Self::StartOrPause if controls.pause => Some(Command::Pause),
            Self::Reset if controls.reset => Some(Command::Reset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_follow_status() {
        let running = Controls::for_status(TimerStatus::Running, 10);
        assert!(!running.start && running.pause && running.reset);

        let paused = Controls::for_status(TimerStatus::Paused, 10);
        assert!(paused.start && !paused.pause && paused.reset);

        let idle_empty = Controls::for_status(TimerStatus::Idle, 0);
        assert!(idle_empty.start && !idle_empty.pause && !idle_empty.reset);

        let idle_set = Controls::for_status(TimerStatus::Idle, 60);
        assert!(idle_set.reset);
    }

    #[test]
    fn space_prefers_start_then_pause() {
        let space = Shortcut::from_code("Space").unwrap();
        assert_eq!(
            space.resolve(Controls::for_status(TimerStatus::Idle, 0)),
            Some(Command::Start)
        );
        assert_eq!(
            space.resolve(Controls::for_status(TimerStatus::Running, 5)),
            Some(Command::Pause)
        );
    }

    #[test]
    fn reset_key_respects_enabled_flag() {
        let reset = Shortcut::from_code("KeyR").unwrap();
        assert_eq!(reset.resolve(Controls::for_status(TimerStatus::Idle, 0)), None);
        assert_eq!(
            reset.resolve(Controls::for_status(TimerStatus::Paused, 5)),
            Some(Command::Reset)
        );
    }

    #[test]
    fn unknown_codes_are_ignored() {
        assert_eq!(Shortcut::from_code("KeyQ"), None);
        assert_eq!(Shortcut::from_code("space"), None);
    }
}
