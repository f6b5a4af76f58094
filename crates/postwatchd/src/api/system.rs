//! System endpoints

use axum::Json;
use postwatch_api::HealthResponse;

/// Daemon health check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Collector is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
