//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{
    Command, HistoryEntry, HistoryLedger, Settings, Shortcut, TimeFields, TimerState,
    TimerStatus, Transition,
};
use crate::{
    error::{TimerError, TimerResult},
    services::{
        FileStorage, LogNotifier, Notification, NotificationKind, Notifier, Renderer,
        SoundPlayer, Storage, TerminalBell, TimerSnapshot, WatchRenderer,
    },
    tasks::CountdownScheduler,
};

/// External collaborators the controller reports to
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn Renderer>,
    pub notifier: Arc<dyn Notifier>,
    pub sound: Arc<dyn SoundPlayer>,
    pub storage: Arc<dyn Storage>,
}

impl Collaborators {
    /// Production collaborators persisting into `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            renderer: Arc::new(WatchRenderer::new()),
            notifier: Arc::new(LogNotifier),
            sound: Arc::new(TerminalBell),
            storage,
        }
    }

    /// Production collaborators backed by JSON files in `dir`
    pub fn with_data_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(dir)))
    }
}

/// The countdown and the ticker driving it, always locked together so a
/// tick never interleaves with a command
struct TimerSession {
    timer: TimerState,
    scheduler: CountdownScheduler,
}

impl TimerSession {
    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(
            self.timer.remaining_time(),
            self.timer.total_time(),
            self.timer.status(),
        )
    }
}

/// Main application state that owns the timer, its history and settings
pub struct AppState {
    session: Mutex<TimerSession>,
    history: Mutex<HistoryLedger>,
    settings: Mutex<Settings>,
    collaborators: Collaborators,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    pub last_notification: Mutex<Option<Notification>>,
}

impl AppState {
    /// Create the controller, loading settings and history from storage
    pub fn new(
        port: u16,
        host: String,
        tick_period: Duration,
        collaborators: Collaborators,
    ) -> Self {
        let settings = collaborators.storage.load_settings().unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        });

        let mut history = HistoryLedger::new(Arc::clone(&collaborators.storage));
        let restored = history.reload();
        info!(
            "Loaded settings (sound={}, dark_mode={}) and {} history entries",
            settings.sound_enabled, settings.dark_mode, restored
        );

        let state = Self {
            session: Mutex::new(TimerSession {
                timer: TimerState::new(),
                scheduler: CountdownScheduler::new(tick_period),
            }),
            history: Mutex::new(history),
            settings: Mutex::new(settings),
            collaborators,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            last_notification: Mutex::new(None),
        };
        state.collaborators.renderer.update(0, 0, TimerStatus::Idle);
        state
    }

    fn lock_session(&self) -> TimerResult<MutexGuard<'_, TimerSession>> {
        self.session.lock().map_err(|e| {
            error!("Failed to lock timer session: {}", e);
            TimerError::from(e)
        })
    }

    /// Apply a command to the timer and adjust the ticker to the outcome.
    ///
    /// Side effects (render, notifications) run after the session lock is
    /// released.
    fn execute<F>(
        self: &Arc<Self>,
        action: &str,
        command: F,
    ) -> TimerResult<(Transition, TimerSnapshot)>
    where
        F: FnOnce(&mut TimerState) -> TimerResult<Transition>,
    {
        let mut session = self.lock_session()?;

        let transition = match command(&mut session.timer) {
            Ok(transition) => transition,
            Err(e) => {
                drop(session);
                self.report_error(action, &e);
                return Err(e);
            }
        };

        if transition.starts_ticker() {
            let weak = Arc::downgrade(self);
            session.scheduler.start(move |generation| {
                if let Some(state) = weak.upgrade() {
                    state.on_tick(generation);
                }
            });
        } else if transition.stops_ticker() {
            session.scheduler.stop();
        }

        let snapshot = session.snapshot();
        drop(session); // Release the lock early

        debug!("{} -> {:?} ({:?})", action, transition, snapshot.status);
        self.record_action(action);
        self.render(&snapshot);
        Ok((transition, snapshot))
    }

    /// Replace the hours/minutes/seconds fields (ignored while a countdown is active)
    pub fn set_fields(
        self: &Arc<Self>,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> TimerResult<TimerSnapshot> {
        self.execute("input", |timer| Ok(timer.set_fields(hours, minutes, seconds)))
            .map(|(_, snapshot)| snapshot)
    }

    /// Start a new countdown from the fields or resume a paused one
    pub fn start(self: &Arc<Self>) -> TimerResult<TimerSnapshot> {
        let (transition, snapshot) = self.execute("start", TimerState::start)?;
        match transition {
            Transition::Started => info!("Timer started for {}s", snapshot.total_seconds),
            Transition::Resumed => {
                info!("Timer resumed with {}s remaining", snapshot.remaining_seconds)
            }
            _ => debug!("Start ignored, timer already running"),
        }
        Ok(snapshot)
    }

    pub fn pause(self: &Arc<Self>) -> TimerResult<TimerSnapshot> {
        let (transition, snapshot) = self.execute("pause", |timer| Ok(timer.pause()))?;
        if transition == Transition::Paused {
            info!("Timer paused with {}s remaining", snapshot.remaining_seconds);
        }
        Ok(snapshot)
    }

    pub fn reset(self: &Arc<Self>) -> TimerResult<TimerSnapshot> {
        let (_, snapshot) = self.execute("reset", |timer| Ok(timer.reset()))?;
        info!("Timer reset");
        Ok(snapshot)
    }

    /// Configure a preset of `minutes` minutes
    pub fn set_preset(self: &Arc<Self>, minutes: i64) -> TimerResult<TimerSnapshot> {
        let (_, snapshot) = self.execute("preset", |timer| timer.set_preset(minutes))?;
        self.notify(
            NotificationKind::Info,
            &format!("Preset set to {} minutes", snapshot.total_seconds / 60),
        );
        Ok(snapshot)
    }

    /// Configure the timer from the history entry at `index` (0 = most recent)
    pub fn load_from_history(self: &Arc<Self>, index: usize) -> TimerResult<TimerSnapshot> {
        let label = match self.history.lock()?.get(index) {
            Some(entry) => entry.time.clone(),
            None => {
                let e = TimerError::UnknownHistoryEntry(index);
                self.report_error("history load", &e);
                return Err(e);
            }
        };

        let (_, snapshot) =
            self.execute("history load", |timer| timer.load_from_history(&label))?;
        self.notify(NotificationKind::Info, &format!("Loaded {} from history", label));
        Ok(snapshot)
    }

    /// Handle a key press. Returns the command it triggered, if any.
    pub fn handle_key(
        self: &Arc<Self>,
        code: &str,
    ) -> TimerResult<Option<(Command, TimerSnapshot)>> {
        let Some(shortcut) = Shortcut::from_code(code) else {
            debug!("Ignoring key {}", code);
            return Ok(None);
        };

        let controls = self.lock_session()?.timer.controls();
        let Some(command) = shortcut.resolve(controls) else {
            debug!("Shortcut {:?} has no enabled command", shortcut);
            return Ok(None);
        };

        let snapshot = match command {
            Command::Start => self.start()?,
            Command::Pause => self.pause()?,
            Command::Reset => self.reset()?,
        };
        Ok(Some((command, snapshot)))
    }

    /// Apply a tick from the scheduler generation `generation`
    pub fn on_tick(&self, generation: u64) {
        let mut session = match self.lock_session() {
            Ok(session) => session,
            Err(_) => return,
        };

        if !session.scheduler.is_current(generation) {
            debug!("Dropping tick from stale ticker generation {}", generation);
            return;
        }

        let transition = session.timer.tick();
        if transition == Transition::Completed {
            session.scheduler.stop();
        }
        let snapshot = session.snapshot();
        drop(session);

        self.render(&snapshot);
        if transition == Transition::Completed {
            self.complete(snapshot.total_seconds);
        }
    }

    fn complete(&self, total_seconds: u32) {
        info!("Timer completed after {}s", total_seconds);
        self.record_action("complete");

        match self.history.lock() {
            Ok(mut history) => {
                history.record(total_seconds);
            }
            Err(e) => error!("Failed to lock history: {}", e),
        }

        self.notify(NotificationKind::Success, "Timer finished!");

        let sound_enabled = self.settings.lock().map(|s| s.sound_enabled).unwrap_or(false);
        if sound_enabled {
            if let Err(e) = self.collaborators.sound.play() {
                debug!("Completion sound skipped: {}", e);
            }
        }
    }

    /// Flip sound on or off and persist the change
    pub fn toggle_sound(&self) -> TimerResult<Settings> {
        self.update_settings("sound", |settings| {
            let enabled = settings.toggle_sound();
            info!("Sound {}", if enabled { "enabled" } else { "muted" });
        })
    }

    /// Flip between light and dark theme and persist the change
    pub fn toggle_theme(&self) -> TimerResult<Settings> {
        self.update_settings("theme", |settings| {
            let dark = settings.toggle_theme();
            info!("Theme set to {}", if dark { "dark" } else { "light" });
        })
    }

    fn update_settings<F>(&self, action: &str, updater: F) -> TimerResult<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.lock()?;
        updater(&mut *settings);
        let updated = *settings;
        drop(settings);

        if let Err(e) = self.collaborators.storage.save_settings(&updated) {
            warn!("Failed to persist settings: {}", e);
        }
        self.record_action(action);
        Ok(updated)
    }

    /// Stop ticking, e.g. before the process exits
    pub fn shutdown(&self) {
        match self.session.lock() {
            Ok(mut session) => {
                if session.scheduler.stop() {
                    info!("Countdown ticker stopped for shutdown");
                }
            }
            Err(e) => error!("Failed to lock timer session on shutdown: {}", e),
        }
    }

    /// Get current timer snapshot
    pub fn get_snapshot(&self) -> TimerResult<TimerSnapshot> {
        Ok(self.lock_session()?.snapshot())
    }

    /// Subscribe to what the renderer publishes, when it publishes a feed
    pub fn watch_display(&self) -> Option<watch::Receiver<TimerSnapshot>> {
        self.collaborators.renderer.subscribe()
    }

    /// The snapshot the presentation currently shows. Falls back to the
    /// session when the renderer keeps no feed.
    pub fn get_display(&self) -> TimerResult<TimerSnapshot> {
        match self.watch_display() {
            Some(rx) => Ok(rx.borrow().clone()),
            None => self.get_snapshot(),
        }
    }

    pub fn get_fields(&self) -> TimerResult<TimeFields> {
        Ok(self.lock_session()?.timer.fields())
    }

    /// Whether a ticker is currently running
    pub fn is_ticking(&self) -> TimerResult<bool> {
        Ok(self.lock_session()?.scheduler.is_active())
    }

    pub fn get_settings(&self) -> TimerResult<Settings> {
        Ok(*self.settings.lock()?)
    }

    pub fn get_history(&self) -> TimerResult<Vec<HistoryEntry>> {
        Ok(self.history.lock()?.entries().to_vec())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn get_last_notification(&self) -> Option<Notification> {
        self.last_notification.lock().ok().and_then(|n| n.clone())
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn render(&self, snapshot: &TimerSnapshot) {
        self.collaborators.renderer.update(
            snapshot.remaining_seconds,
            snapshot.total_seconds,
            snapshot.status,
        );
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.collaborators.notifier.notify(kind, message);
        if let Ok(mut last) = self.last_notification.lock() {
            *last = Some(Notification::new(kind, message));
        }
    }

    fn report_error(&self, action: &str, e: &TimerError) {
        match e {
            TimerError::InvalidDuration => {
                self.notify(NotificationKind::Error, "Please set a valid time!")
            }
            TimerError::InvalidOperation(_)
            | TimerError::MalformedEntry(_)
            | TimerError::UnknownHistoryEntry(_) => {
                warn!("{} rejected: {}", action, e);
                self.notify(NotificationKind::Error, &e.to_string());
            }
            _ => error!("{} failed: {}", action, e),
        }
    }
}
