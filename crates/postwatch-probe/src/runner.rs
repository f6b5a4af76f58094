//! Command runner seam used by the posture probes

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProbeExecError;

/// Result of a probe command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmdOutput {
    /// Exit status code (0 for success)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CmdOutput {
    /// Check if the command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Executes probe commands on the local machine
///
/// Kept as a trait so tests (and alternative transports) can substitute
/// scripted outputs for real OS queries.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cmd: &str) -> Result<CmdOutput, ProbeExecError>;
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CmdOutput, ProbeExecError>;
}
