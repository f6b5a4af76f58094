//! Request types for the collector API

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::posture::PostureSnapshot;

/// Report submission payload (agent → collector)
///
/// Field values are free-form strings on the wire; the collector stores them
/// verbatim and never validates the vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportPayload {
    pub device_id: String,
    pub disk_encryption: String,
    pub os_update: String,
    pub antivirus: String,
    pub sleep_settings: String,
}

impl ReportPayload {
    /// Keys the collector requires on every submission
    pub const REQUIRED_FIELDS: [&'static str; 5] = [
        "device_id",
        "disk_encryption",
        "os_update",
        "antivirus",
        "sleep_settings",
    ];

    /// Encode a typed snapshot for submission
    #[must_use]
    pub fn from_snapshot(device_id: impl Into<String>, snapshot: &PostureSnapshot) -> Self {
        Self {
            device_id: device_id.into(),
            disk_encryption: snapshot.disk_encryption.to_string(),
            os_update: snapshot.os_update.to_string(),
            antivirus: snapshot.antivirus.to_string(),
            sleep_settings: snapshot.sleep_settings.to_string(),
        }
    }
}

/// Exact-match predicates for the filtered latest-state query
///
/// Predicates are ANDed; an absent predicate places no constraint on that
/// field. Filtering applies to each device's latest report only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct ReportFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_encryption: Option<String>,
}

impl ReportFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.os_update.is_none() && self.disk_encryption.is_none()
    }
}
