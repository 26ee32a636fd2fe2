//! Bounded ledger of completed countdowns

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::duration;
use crate::services::Storage;

/// Number of completed runs kept in the ledger
pub const HISTORY_CAPACITY: usize = 10;

/// One completed countdown, stored as `{ time, date, timestamp }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Duration formatted as `M:SS` or `H:MM:SS`
    pub time: String,
    /// Local completion date and time for display
    pub date: String,
    /// Completion time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(duration: u32, completed_at: DateTime<Local>) -> Self {
        Self {
            time: duration::format_label(duration),
            date: completed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            timestamp: completed_at.timestamp_millis(),
        }
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Most-recent-first list of completed runs, written through to storage
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
    storage: Arc<dyn Storage>,
}

impl HistoryLedger {
    /// Create an empty ledger backed by `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            entries: Vec::new(),
            storage,
        }
    }

    /// Replace the in-memory entries with what storage holds.
    ///
    /// Unreadable storage leaves the ledger empty.
    pub fn reload(&mut self) -> usize {
        self.entries = match self.storage.load_history() {
            Ok(mut entries) => {
                entries.truncate(HISTORY_CAPACITY);
                entries
            }
            Err(e) => {
                warn!("Failed to load history, starting empty: {}", e);
                Vec::new()
            }
        };
        debug!("History reloaded with {} entries", self.entries.len());
        self.entries.len()
    }

    /// Record a completed run of `duration` seconds finishing now
    pub fn record(&mut self, duration: u32) -> HistoryEntry {
        self.record_at(duration, Local::now())
    }

    pub fn record_at(&mut self, duration: u32, completed_at: DateTime<Local>) -> HistoryEntry {
        let entry = HistoryEntry::new(duration, completed_at);
        self.entries.insert(0, entry.clone());
        self.entries.truncate(HISTORY_CAPACITY);
        info!("Recorded completed run of {}", entry.time);

        if let Err(e) = self.storage.save_history(&self.entries) {
            warn!("Failed to persist history: {}", e);
        }

        entry
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
