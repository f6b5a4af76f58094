//! High-level posture sampling API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use postwatch_api::{
    AntivirusStatus, DiskEncryption, OsUpdateStatus, PostureSnapshot, SleepSetting,
};
use tracing::{debug, instrument, warn};

use crate::runner::CommandRunner;
use crate::{linux, windows};

/// Upper bound on a single posture command (one hung OS query must not stall
/// the whole cycle)
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of posture snapshots
///
/// Sampling never fails as a whole: each of the four fields independently
/// degrades to `ProbeError` or `Unknown` and a snapshot is always produced.
#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn sample(&self) -> PostureSnapshot;
}

/// Command-backed probe
///
/// Dispatches on the running platform and shells out to the native
/// administrative tooling for each signal.
pub struct CommandProbe {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl CommandProbe {
    /// Create a probe over the given runner
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set the per-command timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one posture command, parse its stdout, or degrade the field
    async fn probe_with<T>(&self, cmd: &str, parse: fn(&str) -> T, degrade: fn(String) -> T) -> T {
        match self.runner.run_with_timeout(cmd, self.timeout).await {
            Ok(out) => parse(&out.stdout),
            Err(e) => {
                warn!(command = %cmd, error = %e, "posture check failed");
                degrade(e.probe_message())
            }
        }
    }

    async fn sample_windows(&self) -> PostureSnapshot {
        PostureSnapshot {
            disk_encryption: self
                .probe_with(
                    windows::DISK_ENCRYPTION_CMD,
                    windows::parse_bitlocker,
                    DiskEncryption::ProbeError,
                )
                .await,
            os_update: self
                .probe_with(
                    windows::OS_UPDATE_CMD,
                    windows::parse_update_results,
                    OsUpdateStatus::ProbeError,
                )
                .await,
            antivirus: self
                .probe_with(
                    windows::ANTIVIRUS_CMD,
                    windows::parse_defender_status,
                    AntivirusStatus::ProbeError,
                )
                .await,
            sleep_settings: self
                .probe_with(
                    windows::SLEEP_CMD,
                    windows::parse_powercfg_sleep,
                    SleepSetting::ProbeError,
                )
                .await,
            sampled_at: Utc::now(),
        }
    }

    async fn sample_linux(&self) -> PostureSnapshot {
        PostureSnapshot {
            disk_encryption: self
                .probe_with(
                    linux::DISK_ENCRYPTION_CMD,
                    linux::parse_lsblk_types,
                    DiskEncryption::ProbeError,
                )
                .await,
            os_update: self
                .probe_with(
                    linux::OS_UPDATE_CMD,
                    linux::parse_apt_upgrade_summary,
                    OsUpdateStatus::ProbeError,
                )
                .await,
            antivirus: self
                .probe_with(
                    linux::ANTIVIRUS_CMD,
                    linux::parse_systemctl_active,
                    AntivirusStatus::ProbeError,
                )
                .await,
            sleep_settings: self
                .probe_with(
                    linux::SLEEP_CMD,
                    linux::parse_idle_delay,
                    SleepSetting::ProbeError,
                )
                .await,
            sampled_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SystemProbe for CommandProbe {
    #[instrument(skip(self))]
    async fn sample(&self) -> PostureSnapshot {
        debug!(os = std::env::consts::OS, "sampling posture");
        match std::env::consts::OS {
            "windows" => self.sample_windows().await,
            "linux" => self.sample_linux().await,
            other => {
                warn!(os = other, "unsupported platform, reporting unknown posture");
                PostureSnapshot::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeExecError;
    use crate::runner::CmdOutput;

    struct ScriptedRunner<F>
    where
        F: Fn(&str) -> Result<CmdOutput, ProbeExecError> + Send + Sync,
    {
        script: F,
    }

    #[async_trait]
    impl<F> CommandRunner for ScriptedRunner<F>
    where
        F: Fn(&str) -> Result<CmdOutput, ProbeExecError> + Send + Sync,
    {
        async fn run(&self, cmd: &str) -> Result<CmdOutput, ProbeExecError> {
            (self.script)(cmd)
        }

        async fn run_with_timeout(
            &self,
            cmd: &str,
            _timeout: Duration,
        ) -> Result<CmdOutput, ProbeExecError> {
            (self.script)(cmd)
        }
    }

    fn ok(stdout: &str) -> Result<CmdOutput, ProbeExecError> {
        Ok(CmdOutput {
            status: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            duration: Duration::from_millis(1),
        })
    }

    fn probe<F>(script: F) -> CommandProbe
    where
        F: Fn(&str) -> Result<CmdOutput, ProbeExecError> + Send + Sync + 'static,
    {
        CommandProbe::new(Arc::new(ScriptedRunner { script }))
    }

    #[tokio::test]
    async fn windows_sample_parses_all_fields() {
        let probe = probe(|cmd| {
            if cmd.contains("manage-bde") {
                ok("Percentage Encrypted: 100.0%")
            } else if cmd.contains("Microsoft.Update.AutoUpdate") {
                ok("ResultCode : Succeeded")
            } else if cmd.contains("Get-MpComputerStatus") {
                ok("AMServiceEnabled : True")
            } else {
                ok("Current AC Power Setting Index: 0x0000012c")
            }
        });

        let snapshot = probe.sample_windows().await;
        assert_eq!(snapshot.disk_encryption, DiskEncryption::Enabled);
        assert_eq!(snapshot.os_update, OsUpdateStatus::UpToDate);
        assert_eq!(snapshot.antivirus, AntivirusStatus::Active);
        assert_eq!(
            snapshot.sleep_settings,
            SleepSetting::Compliant { minutes: 5 }
        );
    }

    #[tokio::test]
    async fn one_failing_check_degrades_only_that_field() {
        let probe = probe(|cmd| {
            if cmd.contains("manage-bde") {
                Err(ProbeExecError::SpawnError("access denied".to_string()))
            } else if cmd.contains("Microsoft.Update.AutoUpdate") {
                ok("ResultCode : Succeeded")
            } else if cmd.contains("Get-MpComputerStatus") {
                ok("AMServiceEnabled : True")
            } else {
                ok("Current AC Power Setting Index: 0x0000012c")
            }
        });

        let snapshot = probe.sample_windows().await;
        assert!(matches!(
            snapshot.disk_encryption,
            DiskEncryption::ProbeError(_)
        ));
        assert_eq!(snapshot.os_update, OsUpdateStatus::UpToDate);
        assert_eq!(snapshot.antivirus, AntivirusStatus::Active);
    }

    #[tokio::test]
    async fn timeout_degrades_to_timeout_message() {
        let probe = probe(|_cmd| {
            Err(ProbeExecError::Timeout {
                timeout: Duration::from_secs(5),
            })
        });

        let snapshot = probe.sample_linux().await;
        assert_eq!(
            snapshot.disk_encryption,
            DiskEncryption::ProbeError("timeout".to_string())
        );
        assert_eq!(
            snapshot.sleep_settings,
            SleepSetting::ProbeError("timeout".to_string())
        );
    }

    #[tokio::test]
    async fn linux_sample_parses_all_fields() {
        let probe = probe(|cmd| {
            if cmd.contains("lsblk") {
                ok("disk\npart\ncrypt\n")
            } else if cmd.contains("apt-get") {
                ok("0 upgraded, 0 newly installed, 0 to remove and 0 not upgraded.\n")
            } else if cmd.contains("systemctl") {
                ok("inactive\n")
            } else {
                ok("uint32 1800\n")
            }
        });

        let snapshot = probe.sample_linux().await;
        assert_eq!(snapshot.disk_encryption, DiskEncryption::Enabled);
        assert_eq!(snapshot.os_update, OsUpdateStatus::UpToDate);
        assert_eq!(snapshot.antivirus, AntivirusStatus::Inactive);
        assert_eq!(
            snapshot.sleep_settings,
            SleepSetting::NonCompliant { minutes: 30 }
        );
    }
}
