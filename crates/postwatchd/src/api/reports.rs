//! Report ingestion and latest-state query endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;
use tracing::info;

use postwatch_api::{ReportFilter, ReportPayload, ReportRecord, SubmitResponse};
use postwatch_store::NewReport;

use crate::api::error::AppError;
use crate::state::AppState;

/// Submit a posture report
///
/// The body is taken untyped so validation can name every missing field in
/// one response instead of failing on the first. Field values are stored
/// verbatim; the collector assigns the observation timestamp and row id.
///
/// # Errors
/// Returns `AppError` on validation failure (400) or store failure (500)
#[utoipa::path(
    post,
    path = "/report",
    request_body = ReportPayload,
    responses(
        (status = 200, description = "Report stored", body = SubmitResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::api::ApiError),
        (status = 500, description = "Store failure", body = crate::api::ApiError)
    )
)]
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<SubmitResponse>, AppError> {
    let new = validate_payload(&payload).map_err(AppError::validation)?;

    let record = state
        .store
        .append(&new)
        .map_err(|e| AppError::internal(format!("failed to store report: {e}")))?;

    info!(device_id = %record.device_id, id = record.id, "report accepted");

    Ok(Json(SubmitResponse {
        status: "ok".to_string(),
        message: format!("report {} stored for {}", record.id, record.device_id),
    }))
}

/// Latest report for one device
///
/// # Errors
/// Returns `AppError` if the device has never reported (404) or on store
/// failure (500)
#[utoipa::path(
    get,
    path = "/reports/{device_id}",
    params(("device_id" = String, Path, description = "Device identifier")),
    responses(
        (status = 200, description = "Latest report", body = ReportRecord),
        (status = 404, description = "No reports for device", body = crate::api::ApiError)
    )
)]
pub async fn device_latest(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<String>,
) -> Result<Json<ReportRecord>, AppError> {
    let record = state
        .store
        .latest_for_device(&device_id)
        .map_err(|e| AppError::internal(format!("latest-report query failed: {e}")))?;

    match record {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::not_found(format!(
            "no reports for device: {device_id}"
        ))),
    }
}

/// Latest report for every known device
///
/// # Errors
/// Returns `AppError` on store failure
#[utoipa::path(
    get,
    path = "/reports",
    responses((status = 200, description = "One report per device", body = [ReportRecord]))
)]
pub async fn list_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReportRecord>>, AppError> {
    let records = state
        .store
        .latest_for_all()
        .map_err(|e| AppError::internal(format!("latest-report query failed: {e}")))?;
    Ok(Json(records))
}

/// Latest reports restricted by posture predicates
///
/// # Errors
/// Returns `AppError` on store failure
#[utoipa::path(
    get,
    path = "/reports/filter",
    params(ReportFilter),
    responses((status = 200, description = "Matching latest reports", body = [ReportRecord]))
)]
pub async fn filter_latest(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Vec<ReportRecord>>, AppError> {
    let records = state
        .store
        .latest_filtered(&filter)
        .map_err(|e| AppError::internal(format!("filtered query failed: {e}")))?;
    Ok(Json(records))
}

/// Check the payload for every required key, collecting all violations
fn validate_payload(payload: &Value) -> Result<NewReport, Vec<String>> {
    let Some(object) = payload.as_object() else {
        return Err(ReportPayload::REQUIRED_FIELDS
            .iter()
            .map(ToString::to_string)
            .collect());
    };

    let mut missing = Vec::new();
    let mut take = |name: &'static str| -> String {
        match object.get(name).and_then(Value::as_str) {
            Some(value) => value.to_string(),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    };

    let device_id = take("device_id");
    let disk_encryption = take("disk_encryption");
    let os_update = take("os_update");
    let antivirus = take("antivirus");
    let sleep_settings = take("sleep_settings");

    if missing.is_empty() {
        Ok(NewReport {
            device_id,
            disk_encryption,
            os_update,
            antivirus,
            sleep_settings,
        })
    } else {
        Err(missing)
    }
}
