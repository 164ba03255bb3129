//! Save and restore the engine state between runs

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::engine::EngineState;
use crate::storage::error::StoreError;

/// Durable home for the engine state. Stores save the whole state at once.
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<EngineState>, StoreError>;

    fn save(&self, state: &EngineState) -> Result<(), StoreError>;
}

/// One pretty-printed JSON file, replaced atomically on every save
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Option<EngineState>, StoreError> {
        if !self.path.exists() {
            tracing::info!("No saved state at {:?}, starting empty", self.path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let state: EngineState = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} predictions and {} outcomes from {:?}",
            state.predictions.len(),
            state.outcome_log.len(),
            self.path
        );
        Ok(Some(state))
    }

    fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!("Saved engine state to {:?}", self.path);
        Ok(())
    }
}

/// Keeps the serialized state in memory; for tests and dry runs
#[derive(Default)]
pub struct MemoryStateStore {
    saved: Mutex<Option<String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_saved(&self) -> bool {
        self.saved.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<EngineState>, StoreError> {
        let saved = self
            .saved
            .lock()
            .map_err(|_| StoreError::Other("memory store lock poisoned".to_string()))?;
        match saved.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| StoreError::Other("memory store lock poisoned".to_string()))?;
        *saved = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{OutcomeEntry, PredictionRecord, PredictionStatus};
    use crate::parser::normalize_suits;

    fn sample_state() -> EngineState {
        let mut state = EngineState::default();
        let mut record = PredictionRecord::new(50, normalize_suits("♠♥"), 47);
        record.resolve(PredictionStatus::Win);
        state.predictions.insert(50, record);
        state.predictions.insert(60, PredictionRecord::new(60, normalize_suits("♦"), 57));
        state.seen_message_fingerprints.insert("f00d".to_string());
        state.outcome_log.push(OutcomeEntry {
            game_number: 50,
            status: PredictionStatus::Win,
        });
        state
    }

    #[test]
    fn test_json_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_json_store_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("nested").join("state.json"));
        let state = sample_state();

        store.save(&state).unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonStateStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStateStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(!store.has_saved());

        let state = sample_state();
        store.save(&state).unwrap();
        assert!(store.has_saved());
        assert_eq!(store.load().unwrap().unwrap(), state);
    }
}
