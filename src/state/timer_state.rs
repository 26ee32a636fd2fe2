//! Countdown state machine
//!
//! `TimerState` owns the input fields, the configured total, the remaining
//! time and the current status. It is a plain value: it never schedules
//! anything itself. Every command returns a [`Transition`] telling the
//! owner whether the countdown ticker has to be started or stopped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{duration, Controls, TimeFields};
use crate::error::{TimerError, TimerResult};

/// Lifecycle of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerStatus {
    /// A countdown is in progress (possibly paused)
    pub fn is_active(self) -> bool {
        matches!(self, TimerStatus::Running | TimerStatus::Paused)
    }

    /// Human readable status line
    pub fn describe(self) -> &'static str {
        match self {
            TimerStatus::Idle => "Ready to start",
            TimerStatus::Running => "Timer running...",
            TimerStatus::Paused => "Timer paused",
            TimerStatus::Completed => "Timer finished!",
        }
    }
}

/// Outcome of applying a command to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle/Completed -> Running with a freshly derived total
    Started,
    /// Paused -> Running, remaining time untouched
    Resumed,
    Paused,
    Reset,
    /// One second was taken off the remaining time
    Ticked,
    /// Remaining time reached zero
    Completed,
    /// Fields, total and remaining time were replaced while stopped
    Configured,
    /// Command was valid but had nothing to do
    Unchanged,
}

impl Transition {
    pub fn starts_ticker(self) -> bool {
        matches!(self, Transition::Started | Transition::Resumed)
    }

    pub fn stops_ticker(self) -> bool {
        matches!(
            self,
            Transition::Paused | Transition::Reset | Transition::Completed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    status: TimerStatus,
    fields: TimeFields,
    total_time: u32,
    remaining_time: u32,
}

impl TimerState {
    /// Create an idle timer with empty fields
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn fields(&self) -> TimeFields {
        self.fields
    }

    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    /// Elapsed share of the configured total, rounded to a whole percent
    pub fn progress_percent(&self) -> u8 {
        duration::progress_percent(self.total_time, self.remaining_time)
    }

    pub fn controls(&self) -> Controls {
        Controls::for_status(self.status, self.total_time)
    }

    /// Replace the input fields while no countdown is in progress.
    ///
    /// Ignored while running or paused, like a locked form.
    pub fn set_fields(&mut self, hours: i64, minutes: i64, seconds: i64) -> Transition {
        if self.status.is_active() {
            return Transition::Unchanged;
        }
        self.configure(TimeFields::new(hours, minutes, seconds));
        Transition::Configured
    }

    /// Start a new countdown from the fields, or resume a paused one
    pub fn start(&mut self) -> TimerResult<Transition> {
        match self.status {
            TimerStatus::Running => Ok(Transition::Unchanged),
            TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                Ok(Transition::Resumed)
            }
            TimerStatus::Idle | TimerStatus::Completed => {
                let total = self.fields.total_seconds();
                if total == 0 {
                    return Err(TimerError::InvalidDuration);
                }
                self.total_time = total;
                self.remaining_time = total;
                self.status = TimerStatus::Running;
                Ok(Transition::Started)
            }
        }
    }

    pub fn pause(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::Unchanged;
        }
        self.status = TimerStatus::Paused;
        Transition::Paused
    }

    /// Return to a clean idle state from anywhere
    pub fn reset(&mut self) -> Transition {
        self.status = TimerStatus::Idle;
        self.fields = TimeFields::zero();
        self.total_time = 0;
        self.remaining_time = 0;
        Transition::Reset
    }

    /// Apply one scheduler tick. Only a running timer is affected.
    pub fn tick(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::Unchanged;
        }

        if self.remaining_time > 0 {
            self.remaining_time -= 1;
            debug!("Tick: {}s remaining", self.remaining_time);
        }

        if self.remaining_time == 0 {
            self.status = TimerStatus::Completed;
            return Transition::Completed;
        }

        Transition::Ticked
    }

    /// Configure the fields to `(0, minutes, 0)`
    pub fn set_preset(&mut self, minutes: i64) -> TimerResult<Transition> {
        self.ensure_stopped("preset")?;
        self.configure(TimeFields::new(0, minutes, 0));
        Ok(Transition::Configured)
    }

    /// Configure the fields from a formatted history label (`M:SS` or `H:MM:SS`)
    pub fn load_from_history(&mut self, label: &str) -> TimerResult<Transition> {
        self.ensure_stopped("history load")?;
        let fields = duration::parse_label(label)
            .ok_or_else(|| TimerError::MalformedEntry(label.to_string()))?;
        self.configure(fields);
        Ok(Transition::Configured)
    }

    fn ensure_stopped(&self, action: &str) -> TimerResult<()> {
        if self.status.is_active() {
            return Err(TimerError::InvalidOperation(format!(
                "cannot apply {} while the timer is {}",
                action,
                if self.status == TimerStatus::Running { "running" } else { "paused" }
            )));
        }
        Ok(())
    }

    fn configure(&mut self, fields: TimeFields) {
        self.fields = fields;
        self.total_time = fields.total_seconds();
        self.remaining_time = self.total_time;
        self.status = TimerStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(seconds: i64) -> TimerState {
        let mut timer = TimerState::new();
        timer.set_fields(0, 0, seconds);
        timer.start().expect("non-zero duration starts");
        timer
    }

    #[test]
    fn new_timer_is_idle_and_empty() {
        let timer = TimerState::new();
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(timer.total_time(), 0);
        assert_eq!(timer.remaining_time(), 0);
    }

    #[test]
    fn start_with_zero_duration_is_rejected() {
        let mut timer = TimerState::new();
        assert_eq!(timer.start(), Err(TimerError::InvalidDuration));
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(timer.total_time(), 0);
    }

    #[test]
    fn start_derives_total_from_fields() {
        let timer = running(5);
        assert_eq!(timer.status(), TimerStatus::Running);
        assert_eq!(timer.total_time(), 5);
        assert_eq!(timer.remaining_time(), 5);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let mut timer = running(5);
        timer.tick();
        assert_eq!(timer.start(), Ok(Transition::Unchanged));
        assert_eq!(timer.remaining_time(), 4);
    }

    #[test]
    fn five_ticks_complete_a_five_second_run() {
        let mut timer = running(5);
        for _ in 0..4 {
            assert_eq!(timer.tick(), Transition::Ticked);
        }
        assert_eq!(timer.tick(), Transition::Completed);
        assert_eq!(timer.status(), TimerStatus::Completed);
        assert_eq!(timer.remaining_time(), 0);
    }

    #[test]
    fn tick_never_goes_below_zero() {
        let mut timer = running(3);
        for _ in 0..10 {
            timer.tick();
            assert!(timer.remaining_time() <= timer.total_time());
        }
        assert_eq!(timer.remaining_time(), 0);
        assert_eq!(timer.tick(), Transition::Unchanged);
    }

    #[test]
    fn tick_is_ignored_unless_running() {
        let mut timer = running(10);
        timer.pause();
        assert_eq!(timer.tick(), Transition::Unchanged);
        assert_eq!(timer.remaining_time(), 10);

        let mut idle = TimerState::new();
        assert_eq!(idle.tick(), Transition::Unchanged);
    }

    #[test]
    fn pause_then_start_resumes() {
        let mut timer = running(10);
        timer.tick();
        timer.tick();
        assert_eq!(timer.pause(), Transition::Paused);
        assert_eq!(timer.start(), Ok(Transition::Resumed));
        assert_eq!(timer.remaining_time(), 8);
        assert_eq!(timer.total_time(), 10);
    }

    #[test]
    fn pause_outside_running_is_noop() {
        let mut timer = TimerState::new();
        assert_eq!(timer.pause(), Transition::Unchanged);
        assert_eq!(timer.status(), TimerStatus::Idle);
    }

    #[test]
    fn reset_clears_everything_from_any_state() {
        let mut running_timer = running(10);
        running_timer.tick();

        let mut paused = running(10);
        paused.pause();

        let mut completed = running(1);
        completed.tick();

        let mut configured = TimerState::new();
        configured.set_fields(1, 2, 3);

        for mut timer in [running_timer, paused, completed, configured] {
            assert_eq!(timer.reset(), Transition::Reset);
            assert_eq!(timer.status(), TimerStatus::Idle);
            assert_eq!(timer.total_time(), 0);
            assert_eq!(timer.remaining_time(), 0);
            assert_eq!(timer.fields(), TimeFields::zero());
        }
    }

    #[test]
    fn completed_timer_restarts_from_fields() {
        let mut timer = running(1);
        timer.tick();
        assert_eq!(timer.start(), Ok(Transition::Started));
        assert_eq!(timer.remaining_time(), 1);
    }

    #[test]
    fn preset_configures_minutes() {
        let mut timer = TimerState::new();
        assert_eq!(timer.set_preset(25), Ok(Transition::Configured));
        assert_eq!(timer.fields(), TimeFields::new(0, 25, 0));
        assert_eq!(timer.total_time(), 1500);
        assert_eq!(timer.remaining_time(), 1500);
    }

    #[test]
    fn preset_while_paused_is_rejected() {
        let mut timer = running(30);
        timer.pause();
        let before = timer.clone();
        assert!(matches!(
            timer.set_preset(25),
            Err(TimerError::InvalidOperation(_))
        ));
        assert_eq!(timer, before);
    }

    #[test]
    fn history_label_loads_fields() {
        let mut timer = TimerState::new();
        timer.load_from_history("2:05").unwrap();
        assert_eq!(timer.fields(), TimeFields::new(0, 2, 5));
        assert_eq!(timer.total_time(), 125);

        timer.load_from_history("1:00:30").unwrap();
        assert_eq!(timer.total_time(), 3630);
    }

    #[test]
    fn malformed_history_label_leaves_state() {
        let mut timer = TimerState::new();
        timer.set_fields(0, 1, 0);
        let before = timer.clone();
        assert!(matches!(
            timer.load_from_history("soon"),
            Err(TimerError::MalformedEntry(_))
        ));
        assert_eq!(timer, before);
    }

    #[test]
    fn fields_are_locked_while_active() {
        let mut timer = running(10);
        assert_eq!(timer.set_fields(0, 5, 0), Transition::Unchanged);
        assert_eq!(timer.total_time(), 10);
    }

    #[test]
    fn progress_rounds_elapsed_share() {
        let mut timer = running(3);
        assert_eq!(timer.progress_percent(), 0);
        timer.tick();
        assert_eq!(timer.progress_percent(), 33);
        timer.tick();
        assert_eq!(timer.progress_percent(), 67);
        timer.tick();
        assert_eq!(timer.progress_percent(), 100);
    }
}
