//! Error types for probe command execution

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a probe command
#[derive(Error, Debug, Clone)]
pub enum ProbeExecError {
    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },
}

impl ProbeExecError {
    /// Message recorded in the posture field when this error degrades a check
    #[must_use]
    pub fn probe_message(&self) -> String {
        match self {
            ProbeExecError::Timeout { .. } => "timeout".to_string(),
            other => other.to_string(),
        }
    }
}
