//! Response types for the collector API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A persisted report row, as returned by the query endpoints
///
/// `id` and `observed_at` are collector-assigned at insertion time; rows are
/// immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportRecord {
    /// Insertion-order row identifier (strictly increasing)
    pub id: i64,
    pub device_id: String,
    /// Collector clock at insertion, not client-supplied
    pub observed_at: DateTime<Utc>,
    pub disk_encryption: String,
    pub os_update: String,
    pub antivirus: String,
    pub sleep_settings: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
