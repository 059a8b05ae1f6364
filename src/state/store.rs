//! Persisted state snapshot
//!
//! Written once at shutdown, read once at startup. A missing or broken
//! file just means there is no previous state.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::tray_state::TrayState;

/// The subset of state carried across restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub id: usize,
    pub name: String,
    pub is_connected: bool,
    #[serde(default)]
    pub quiet: bool,
}

impl From<&TrayState> for SaveState {
    fn from(state: &TrayState) -> Self {
        Self {
            id: state.layer_id(),
            name: state.layer_name().to_string(),
            is_connected: state.is_connected(),
            quiet: state.is_quiet(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state file I/O: {0}")]
    Io(#[from] io::Error),

    #[error("state file JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the snapshot at a fixed location
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Persist the snapshot of `state`. Failures are logged and ignored.
    pub fn save(&self, state: &TrayState) {
        let snapshot = SaveState::from(state);
        match self.write(&snapshot) {
            Ok(()) => info!(?snapshot, path = ?self.path, "saved state"),
            Err(e) => error!(error = %e, path = ?self.path, "failed to save state"),
        }
    }

    fn write(&self, snapshot: &SaveState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Load the previous snapshot, or `None` if there is none usable
    pub fn load(&self) -> Option<SaveState> {
        match self.read() {
            Ok(snapshot) => {
                info!(?snapshot, "loaded previous state");
                Some(snapshot)
            }
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no previous state");
                None
            }
            Err(e) => {
                info!(error = %e, path = ?self.path, "ignoring previous state");
                None
            }
        }
    }

    fn read(&self) -> Result<SaveState, StoreError> {
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
