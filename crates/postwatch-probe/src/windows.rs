//! Windows posture commands and output parsing
//!
//! Commands mirror the built-in administrative tooling: `manage-bde` for
//! BitLocker, the Windows Update COM agent and Defender status via
//! PowerShell, and `powercfg` for the idle sleep timeout.

use postwatch_api::{AntivirusStatus, DiskEncryption, OsUpdateStatus, SleepSetting};

pub const DISK_ENCRYPTION_CMD: &str = "manage-bde -status";

pub const OS_UPDATE_CMD: &str =
    r#"powershell -Command "(New-Object -ComObject Microsoft.Update.AutoUpdate).Results""#;

pub const ANTIVIRUS_CMD: &str = r#"powershell -Command "Get-MpComputerStatus | Select-Object -Property AMServiceEnabled, RealTimeProtectionEnabled""#;

pub const SLEEP_CMD: &str =
    r#"powershell -Command "powercfg -query SCHEME_CURRENT SUB_SLEEP STANDBYIDLE""#;

/// BitLocker reports a "Percentage Encrypted" line for encrypted volumes
pub fn parse_bitlocker(stdout: &str) -> DiskEncryption {
    if stdout.contains("Percentage Encrypted") {
        DiskEncryption::Enabled
    } else {
        DiskEncryption::Disabled
    }
}

/// Classify the Windows Update agent's last-run results
pub fn parse_update_results(stdout: &str) -> OsUpdateStatus {
    if stdout.contains("Succeeded") || stdout.contains("NotStarted") {
        OsUpdateStatus::UpToDate
    } else if stdout.contains("InProgress") {
        OsUpdateStatus::InProgress
    } else {
        OsUpdateStatus::Outdated
    }
}

/// Defender is considered active if either service flag reports True
pub fn parse_defender_status(stdout: &str) -> AntivirusStatus {
    if stdout.contains("True") {
        AntivirusStatus::Active
    } else {
        AntivirusStatus::Inactive
    }
}

/// Extract the idle timeout from `powercfg` output
///
/// The value appears as a hex "Power Setting Index" in seconds. An
/// unparseable or absent index degrades to `Unknown`, not an error: the
/// command ran, the answer just was not readable.
pub fn parse_powercfg_sleep(stdout: &str) -> SleepSetting {
    for line in stdout.lines() {
        if !line.contains("Power Setting Index") {
            continue;
        }
        let Some(raw) = line.split_whitespace().last() else {
            return SleepSetting::Unknown;
        };
        let hex = raw.strip_prefix("0x").unwrap_or(raw);
        let Ok(seconds) = u32::from_str_radix(hex, 16) else {
            return SleepSetting::Unknown;
        };
        return SleepSetting::from_minutes(seconds / 60);
    }
    SleepSetting::Unknown
}
