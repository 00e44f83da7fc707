//! State snapshot persistence.
//!
//! The state-changed consumer keeps the latest snapshot per job name so an
//! external observer can read every job's most recent progress.
//! [`JsonStateManager`] mirrors the in-memory list to a JSON file on every
//! update.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::progress::StateSnapshot;

/// Keeps one snapshot per job name, replaced on every state change.
pub trait StateManager {
    /// Replace the stored snapshot for the snapshot's job name, or insert
    /// one if the name is new.
    fn update_state(&mut self, snapshot: StateSnapshot) -> Result<(), EngineError>;

    fn get_all_states(&self) -> Vec<StateSnapshot>;

    fn clear_all(&mut self) -> Result<(), EngineError>;
}

/// JSON-file-backed state manager.
pub struct JsonStateManager {
    file_path: PathBuf,
    states: Vec<StateSnapshot>,
}

impl JsonStateManager {
    /// Open the state file, loading any existing snapshots. A missing or
    /// empty file yields an empty list.
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self, EngineError> {
        let file_path = file_path.as_ref().to_path_buf();
        let states = Self::load(&file_path)?;
        Ok(JsonStateManager { file_path, states })
    }

    fn load(file_path: &Path) -> Result<Vec<StateSnapshot>, EngineError> {
        if !file_path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(file_path).map_err(|e| EngineError::Persistence {
            path: file_path.to_path_buf(),
            source: e,
        })?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    fn persist(&self) -> Result<(), EngineError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| EngineError::Persistence {
                    path: self.file_path.clone(),
                    source: e,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.states)?;
        fs::write(&self.file_path, json).map_err(|e| EngineError::Persistence {
            path: self.file_path.clone(),
            source: e,
        })
    }
}

impl StateManager for JsonStateManager {
    fn update_state(&mut self, snapshot: StateSnapshot) -> Result<(), EngineError> {
        match self.states.iter_mut().find(|s| s.name == snapshot.name) {
            Some(existing) => *existing = snapshot,
            None => self.states.push(snapshot),
        }
        self.persist()
    }

    fn get_all_states(&self) -> Vec<StateSnapshot> {
        self.states.clone()
    }

    fn clear_all(&mut self) -> Result<(), EngineError> {
        self.states.clear();
        self.persist()
    }
}
