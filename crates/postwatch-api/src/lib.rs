//! postwatch-api: Shared API types and schemas
//!
//! Contains the typed posture model, report payload/record types, and
//! response schemas used across the collector daemon, agent, and CLI.

pub mod posture;
pub mod requests;
pub mod responses;

pub use posture::{
    AntivirusStatus, DiskEncryption, OsUpdateStatus, PostureSnapshot, SleepSetting,
    SLEEP_POLICY_MINUTES,
};
pub use requests::{ReportFilter, ReportPayload};
pub use responses::{HealthResponse, ReportRecord, SubmitResponse};
