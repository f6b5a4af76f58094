//! Local last-known-state persistence
//!
//! The agent owns this file exclusively and never consults collector state
//! to decide whether to report.

use std::fs;
use std::path::PathBuf;

use postwatch_api::PostureSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur reading or writing the local state file
#[derive(Error, Debug)]
pub enum StateError {
    /// Filesystem failure
    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State file could not be encoded or decoded
    #[error("state encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The agent's last successfully observed snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAgentState {
    pub last_snapshot: PostureSnapshot,
}

/// Durable storage for [`LocalAgentState`] with atomic replace semantics
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the previous state; `None` if the agent has never persisted one
    pub fn load(&self) -> Result<Option<LocalAgentState>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Persist the state, replacing any previous file
    ///
    /// Writes to a sibling temp file and renames it into place so a process
    /// kill mid-write never leaves a partial state file behind.
    pub fn save(&self, state: &LocalAgentState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "local state persisted");
        Ok(())
    }
}
