//! Persistence of the timer state in a single named slot

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info, warn};

use crate::{
    error::{PomodoroError, Result},
    state::PersistedState,
};

/// Fixed key of the persistence slot
pub const STATE_KEY: &str = "pomodoroState";

/// Whole-blob storage for [`PersistedState`].
///
/// `load` returns `Ok(None)` when the slot was never written.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedState>>;
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Load the stored state, falling back to defaults on absence or failure
pub fn load_or_default(store: &dyn StateStore) -> PersistedState {
    match store.load() {
        Ok(Some(state)) => {
            debug!("Loaded persisted state: phase={}", state.phase);
            state
        }
        Ok(None) => {
            info!("No persisted state found, starting fresh");
            PersistedState::default()
        }
        Err(e) => {
            warn!("{}, starting from defaults", e);
            PersistedState::default()
        }
    }
}

/// JSON file named after [`STATE_KEY`] inside a state directory
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STATE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, reason: impl ToString) -> PomodoroError {
        PomodoroError::PersistenceRead {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn write_error(&self, reason: impl ToString) -> PomodoroError {
        PomodoroError::PersistenceWrite {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.read_error(e)),
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| self.read_error(e))
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;
        }

        let json = serde_json::to_string_pretty(state).map_err(|e| self.write_error(e))?;

        // rename is atomic, so readers never see a half-written blob
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))?;
        Ok(())
    }
}

/// Slot kept in memory only, for ephemeral runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw blob, which need not be valid
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }

    /// Raw contents of the slot
    pub fn blob(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn path() -> PathBuf {
        PathBuf::from(format!("memory:{}", STATE_KEY))
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| PomodoroError::StateLock(format!("memory store: {}", e)))?;

        match slot.as_deref() {
            None => Ok(None),
            Some(blob) => serde_json::from_str(blob)
                .map(Some)
                .map_err(|e| PomodoroError::PersistenceRead {
                    path: Self::path(),
                    reason: e.to_string(),
                }),
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string(state).map_err(|e| PomodoroError::PersistenceWrite {
            path: Self::path(),
            reason: e.to_string(),
        })?;

        let mut slot = self
            .slot
            .lock()
            .map_err(|e| PomodoroError::StateLock(format!("memory store: {}", e)))?;
        *slot = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PhaseState, Settings, Theme, TimerSnapshot};

    fn sample_state() -> PersistedState {
        let snapshot = TimerSnapshot {
            phase: PhaseState::LongBreak,
            remaining_seconds: 321,
            running: true,
            repetition_index: 4,
            period_end_epoch_millis: Some(1_700_000_321_000),
        };
        let theme = Theme {
            card_opacity: 0.25,
            background_image: Some("/tmp/mountains.png".to_string()),
        };
        PersistedState::new(&snapshot, &Settings::new(1500, 300, 1200, 8).unwrap(), &theme)
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&sample_state()).unwrap();

        let loaded = store.load().unwrap().expect("state should exist");
        assert_eq!(loaded, sample_state());
        assert!(store.path().ends_with("pomodoroState.json"));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_malformed_blob() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, PomodoroError::PersistenceRead { .. }));
        assert_eq!(load_or_default(&store), PersistedState::default());
    }

    #[test]
    fn test_file_store_write_failure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = FileStore::new(&blocker);
        let err = store.save(&sample_state()).unwrap_err();
        assert!(matches!(err, PomodoroError::PersistenceWrite { .. }));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample_state()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_state()));
        assert!(store.blob().unwrap().contains("\"phase\":\"longBreak\""));

        let broken = MemoryStore::with_blob("[1, 2, 3]");
        assert!(broken.load().is_err());
    }
}
