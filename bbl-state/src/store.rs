//! File store for the state document
//!
//! State lives in `bbl-state.json` inside the state directory. Saves write a
//! sibling temp file and rename it into place so readers never observe a
//! partial document.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::state::State;

/// Name of the state file inside the state directory
pub const STATE_FILE: &str = "bbl-state.json";

/// Errors that can occur when loading or saving state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state file: {0}")]
    Read(String),

    #[error("failed to parse state file: {0}")]
    Parse(String),

    #[error("failed to write state file: {0}")]
    Write(String),

    #[error("failed to delete state file: {0}")]
    Delete(String),

    #[error(
        "state file version {0} is newer than this version of bbl supports, please upgrade bbl"
    )]
    UnsupportedVersion(u64),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Loads and saves the state document in a state directory
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the state file
    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Read the state document, or a fresh empty state when none exists
    pub fn load(&self) -> StoreResult<State> {
        let path = self.path();
        if !path.exists() {
            return Ok(State::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| StoreError::Read(e.to_string()))?;
        let state: State =
            serde_json::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))?;

        if state.version > State::CURRENT_VERSION {
            return Err(StoreError::UnsupportedVersion(state.version));
        }

        Ok(state)
    }

    /// Write the state document atomically
    pub fn save(&self, state: &State) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let path = self.path();
        let tmp = temp_path(&path);
        fs::write(&tmp, content).map_err(|e| StoreError::Write(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }

    /// Remove the state file. Absence is not an error.
    pub fn delete(&self) -> StoreResult<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Delete(e.to_string())),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
