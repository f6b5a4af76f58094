//! Linux posture commands and output parsing

use postwatch_api::{AntivirusStatus, DiskEncryption, OsUpdateStatus, SleepSetting};

pub const DISK_ENCRYPTION_CMD: &str = "lsblk -rno TYPE";

/// Simulated upgrade run; prints a summary line without touching the system
pub const OS_UPDATE_CMD: &str = "apt-get -s -o Debug::NoLocking=true upgrade";

pub const ANTIVIRUS_CMD: &str = "systemctl is-active clamav-daemon";

pub const SLEEP_CMD: &str = "gsettings get org.gnome.desktop.session idle-delay";

/// Any `crypt` mapper row means a dm-crypt/LUKS volume is in use
pub fn parse_lsblk_types(stdout: &str) -> DiskEncryption {
    if stdout.lines().any(|line| line.trim() == "crypt") {
        DiskEncryption::Enabled
    } else {
        DiskEncryption::Disabled
    }
}

/// Read the upgrade count from apt's summary line
///
/// The line looks like `3 upgraded, 0 newly installed, 0 to remove and 0 not
/// upgraded.`; no such line (apt missing, different distro) degrades to
/// `Unknown`.
pub fn parse_apt_upgrade_summary(stdout: &str) -> OsUpdateStatus {
    for line in stdout.lines() {
        let Some(idx) = line.find(" upgraded,") else {
            continue;
        };
        let Ok(count) = line[..idx].trim().parse::<u32>() else {
            continue;
        };
        return if count == 0 {
            OsUpdateStatus::UpToDate
        } else {
            OsUpdateStatus::Outdated
        };
    }
    OsUpdateStatus::Unknown
}

/// `systemctl is-active` prints a single state word
pub fn parse_systemctl_active(stdout: &str) -> AntivirusStatus {
    match stdout.trim() {
        "active" => AntivirusStatus::Active,
        "inactive" | "failed" => AntivirusStatus::Inactive,
        _ => AntivirusStatus::Unknown,
    }
}

/// GNOME reports the idle delay as `uint32 <seconds>`
///
/// A value of 0 means idle sleep is disabled entirely; that is neither a
/// resolved timeout nor a policy judgement this probe can make, so it maps
/// to `Unknown`.
pub fn parse_idle_delay(stdout: &str) -> SleepSetting {
    let Some(raw) = stdout.trim().strip_prefix("uint32 ") else {
        return SleepSetting::Unknown;
    };
    let Ok(seconds) = raw.trim().parse::<u32>() else {
        return SleepSetting::Unknown;
    };
    if seconds == 0 {
        return SleepSetting::Unknown;
    }
    SleepSetting::from_minutes(seconds / 60)
}
