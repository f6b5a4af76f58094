//! Typed posture field values and the four-signal snapshot
//!
//! Each field is a tagged result: a concrete reading, `Unknown` when the
//! platform gives no answer, or `ProbeError` carrying the diagnostic message
//! from a failed check. On the wire every field travels as a human-readable
//! string; the collector stores those strings verbatim, so new variants can be
//! introduced on the agent side without a collector change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Idle timeout threshold in minutes. Sleep settings above this violate policy.
pub const SLEEP_POLICY_MINUTES: u32 = 10;

const ERROR_PREFIX: &str = "Error: ";

/// Disk encryption state of the endpoint's system volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DiskEncryption {
    Enabled,
    Disabled,
    Unknown,
    ProbeError(String),
}

impl std::fmt::Display for DiskEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskEncryption::Enabled => write!(f, "Enabled"),
            DiskEncryption::Disabled => write!(f, "Disabled"),
            DiskEncryption::Unknown => write!(f, "Unknown"),
            DiskEncryption::ProbeError(msg) => write!(f, "{ERROR_PREFIX}{msg}"),
        }
    }
}

impl From<&str> for DiskEncryption {
    fn from(s: &str) -> Self {
        if let Some(msg) = s.strip_prefix(ERROR_PREFIX) {
            return DiskEncryption::ProbeError(msg.to_string());
        }
        match s {
            "Enabled" => DiskEncryption::Enabled,
            "Disabled" => DiskEncryption::Disabled,
            _ => DiskEncryption::Unknown,
        }
    }
}

impl From<String> for DiskEncryption {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<DiskEncryption> for String {
    fn from(v: DiskEncryption) -> Self {
        v.to_string()
    }
}

/// Operating system patch state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OsUpdateStatus {
    UpToDate,
    InProgress,
    Outdated,
    Unknown,
    ProbeError(String),
}

impl std::fmt::Display for OsUpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsUpdateStatus::UpToDate => write!(f, "Up to date"),
            OsUpdateStatus::InProgress => write!(f, "Updates in progress"),
            OsUpdateStatus::Outdated => write!(f, "Outdated"),
            OsUpdateStatus::Unknown => write!(f, "Unknown"),
            OsUpdateStatus::ProbeError(msg) => write!(f, "{ERROR_PREFIX}{msg}"),
        }
    }
}

impl From<&str> for OsUpdateStatus {
    fn from(s: &str) -> Self {
        if let Some(msg) = s.strip_prefix(ERROR_PREFIX) {
            return OsUpdateStatus::ProbeError(msg.to_string());
        }
        match s {
            "Up to date" => OsUpdateStatus::UpToDate,
            "Updates in progress" => OsUpdateStatus::InProgress,
            "Outdated" => OsUpdateStatus::Outdated,
            _ => OsUpdateStatus::Unknown,
        }
    }
}

impl From<String> for OsUpdateStatus {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<OsUpdateStatus> for String {
    fn from(v: OsUpdateStatus) -> Self {
        v.to_string()
    }
}

/// Antivirus service state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AntivirusStatus {
    Active,
    Inactive,
    Unknown,
    ProbeError(String),
}

impl std::fmt::Display for AntivirusStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AntivirusStatus::Active => write!(f, "Antivirus running"),
            AntivirusStatus::Inactive => write!(f, "Antivirus not active"),
            AntivirusStatus::Unknown => write!(f, "Unknown"),
            AntivirusStatus::ProbeError(msg) => write!(f, "{ERROR_PREFIX}{msg}"),
        }
    }
}

impl From<&str> for AntivirusStatus {
    fn from(s: &str) -> Self {
        if let Some(msg) = s.strip_prefix(ERROR_PREFIX) {
            return AntivirusStatus::ProbeError(msg.to_string());
        }
        match s {
            "Antivirus running" => AntivirusStatus::Active,
            "Antivirus not active" => AntivirusStatus::Inactive,
            _ => AntivirusStatus::Unknown,
        }
    }
}

impl From<String> for AntivirusStatus {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<AntivirusStatus> for String {
    fn from(v: AntivirusStatus) -> Self {
        v.to_string()
    }
}

/// Idle sleep timeout, judged against [`SLEEP_POLICY_MINUTES`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SleepSetting {
    Compliant { minutes: u32 },
    NonCompliant { minutes: u32 },
    Unknown,
    ProbeError(String),
}

impl SleepSetting {
    /// Classify a resolved idle timeout against the policy threshold
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes <= SLEEP_POLICY_MINUTES {
            SleepSetting::Compliant { minutes }
        } else {
            SleepSetting::NonCompliant { minutes }
        }
    }
}

impl std::fmt::Display for SleepSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepSetting::Compliant { minutes } => write!(f, "Sleep OK ({minutes} min)"),
            SleepSetting::NonCompliant { minutes } => {
                write!(f, "Sleep exceeds {SLEEP_POLICY_MINUTES} min ({minutes} min)")
            }
            SleepSetting::Unknown => write!(f, "Unknown"),
            SleepSetting::ProbeError(msg) => write!(f, "{ERROR_PREFIX}{msg}"),
        }
    }
}

impl From<&str> for SleepSetting {
    fn from(s: &str) -> Self {
        if let Some(msg) = s.strip_prefix(ERROR_PREFIX) {
            return SleepSetting::ProbeError(msg.to_string());
        }
        if let Some(minutes) = parse_bracketed_minutes(s, "Sleep OK (") {
            return SleepSetting::Compliant { minutes };
        }
        let exceeds_prefix = format!("Sleep exceeds {SLEEP_POLICY_MINUTES} min (");
        if let Some(minutes) = parse_bracketed_minutes(s, &exceeds_prefix) {
            return SleepSetting::NonCompliant { minutes };
        }
        SleepSetting::Unknown
    }
}

impl From<String> for SleepSetting {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<SleepSetting> for String {
    fn from(v: SleepSetting) -> Self {
        v.to_string()
    }
}

/// Parse the `<n>` out of `"<prefix><n> min)"`
fn parse_bracketed_minutes(s: &str, prefix: &str) -> Option<u32> {
    s.strip_prefix(prefix)?
        .strip_suffix(" min)")?
        .parse()
        .ok()
}

/// The four-signal security posture of one endpoint at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureSnapshot {
    pub disk_encryption: DiskEncryption,
    pub os_update: OsUpdateStatus,
    pub antivirus: AntivirusStatus,
    pub sleep_settings: SleepSetting,
    /// When the probe ran. Not part of snapshot equality: two probes of
    /// identical posture taken at different times compare equal.
    pub sampled_at: DateTime<Utc>,
}

impl PostureSnapshot {
    /// Snapshot with every field unreadable (unsupported platform)
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            disk_encryption: DiskEncryption::Unknown,
            os_update: OsUpdateStatus::Unknown,
            antivirus: AntivirusStatus::Unknown,
            sleep_settings: SleepSetting::Unknown,
            sampled_at: Utc::now(),
        }
    }
}

impl PartialEq for PostureSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.disk_encryption == other.disk_encryption
            && self.os_update == other.os_update
            && self.antivirus == other.antivirus
            && self.sleep_settings == other.sleep_settings
    }
}

impl Eq for PostureSnapshot {}
