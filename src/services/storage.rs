//! Persistence for history and settings
//!
//! Storage backends only move data; deciding what to do when they fail is
//! left to the caller, which falls back to defaults.

use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    error::{TimerError, TimerResult},
    state::{HistoryEntry, Settings},
};

pub const HISTORY_FILE: &str = "history.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// Backend for the history ledger and the settings blob
pub trait Storage: Send + Sync {
    /// Stored history, empty when nothing was saved yet
    fn load_history(&self) -> TimerResult<Vec<HistoryEntry>>;

    fn save_history(&self, entries: &[HistoryEntry]) -> TimerResult<()>;

    /// Stored settings, defaults when nothing was saved yet
    fn load_settings(&self) -> TimerResult<Settings>;

    fn save_settings(&self, settings: &Settings) -> TimerResult<()>;
}

/// JSON files in a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> TimerResult<Option<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            debug!("{} not found, using defaults", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            TimerError::StorageUnavailable(format!("unable to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map(Some).map_err(|e| {
            TimerError::StorageUnavailable(format!(
                "invalid JSON in {} at line {}, column {}: {}",
                path.display(),
                e.line(),
                e.column(),
                e
            ))
        })
    }

    /// Write through a temporary file and rename, so readers never see a
    /// half-written document
    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> TimerResult<()> {
        let unavailable = |e: std::io::Error| {
            TimerError::StorageUnavailable(format!("unable to write {}: {}", name, e))
        };

        fs::create_dir_all(&self.dir).map_err(unavailable)?;
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{}.tmp", name));

        let content = serde_json::to_string_pretty(value).map_err(|e| {
            TimerError::StorageUnavailable(format!("unable to encode {}: {}", name, e))
        })?;
        fs::write(&tmp, content).map_err(unavailable)?;
        fs::rename(&tmp, &path).map_err(unavailable)?;

        debug!("Saved {}", path.display());
        Ok(())
    }
}

impl Storage for FileStorage {
    fn load_history(&self) -> TimerResult<Vec<HistoryEntry>> {
        Ok(self
            .read_json::<Vec<HistoryEntry>>(HISTORY_FILE)?
            .unwrap_or_default())
    }

    fn save_history(&self, entries: &[HistoryEntry]) -> TimerResult<()> {
        self.write_json(HISTORY_FILE, entries)
    }

    fn load_settings(&self) -> TimerResult<Settings> {
        Ok(self
            .read_json::<Settings>(SETTINGS_FILE)?
            .unwrap_or_default())
    }

    fn save_settings(&self, settings: &Settings) -> TimerResult<()> {
        self.write_json(SETTINGS_FILE, settings)
    }
}

/// In-process storage, used by tests and when no data directory is wanted
#[derive(Debug, Default)]
pub struct MemoryStorage {
    history: Mutex<Vec<HistoryEntry>>,
    settings: Mutex<Option<Settings>>,
    failure: Mutex<Option<TimerError>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `error`
    pub fn fail_with(&self, error: TimerError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    fn check(&self) -> TimerResult<()> {
        match self.failure.lock()?.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Storage for MemoryStorage {
    fn load_history(&self) -> TimerResult<Vec<HistoryEntry>> {
        self.check()?;
        Ok(self.history.lock()?.clone())
    }

    fn save_history(&self, entries: &[HistoryEntry]) -> TimerResult<()> {
        self.check()?;
        *self.history.lock()? = entries.to_vec();
        Ok(())
    }

    fn load_settings(&self) -> TimerResult<Settings> {
        self.check()?;
        Ok(self.settings.lock()?.unwrap_or_default())
    }

    fn save_settings(&self, settings: &Settings) -> TimerResult<()> {
        self.check()?;
        *self.settings.lock()? = Some(*settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::tempdir;

    #[test]
    fn missing_files_load_as_defaults() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("nested"));
        assert!(storage.load_history().unwrap().is_empty());
        assert_eq!(storage.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn history_is_written_as_json_array() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        let entries = vec![HistoryEntry::new(125, Local::now())];
        storage.save_history(&entries).unwrap();

        let raw = fs::read_to_string(dir.path().join(HISTORY_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["time"], "2:05");
        assert!(value[0]["date"].is_string());
        assert!(value[0]["timestamp"].is_i64());
        assert!(!dir.path().join(format!("{}.tmp", HISTORY_FILE)).exists());

        assert_eq!(storage.load_history().unwrap(), entries);
    }

    #[test]
    fn settings_round_trip_on_disk() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        let settings = Settings {
            sound_enabled: false,
            dark_mode: true,
        };
        storage.save_settings(&settings).unwrap();
        assert_eq!(storage.load_settings().unwrap(), settings);
    }

    #[test]
    fn malformed_files_report_storage_unavailable() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(HISTORY_FILE), "{ not-json").unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "[1, 2]").unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.load_history(),
            Err(TimerError::StorageUnavailable(_))
        ));
        assert!(matches!(
            storage.load_settings(),
            Err(TimerError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn memory_storage_can_be_forced_to_fail() {
        let storage = MemoryStorage::new();
        storage.save_settings(&Settings::default()).unwrap();
        storage.fail_with(TimerError::StorageUnavailable("offline".into()));
        assert!(storage.load_settings().is_err());
        assert!(storage.save_history(&[]).is_err());
    }
}
