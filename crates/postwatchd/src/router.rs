//! HTTP router configuration

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::{error, reports, system};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        system::health,
        reports::submit_report,
        reports::list_latest,
        reports::filter_latest,
        reports::device_latest,
    ),
    components(schemas(
        postwatch_api::ReportPayload,
        postwatch_api::ReportRecord,
        postwatch_api::ReportFilter,
        postwatch_api::SubmitResponse,
        postwatch_api::HealthResponse,
        error::ApiError,
    ))
)]
struct ApiDoc;

/// Create the application router
///
/// Note the route order: `/reports/filter` is a static segment and must not
/// be captured by the `{device_id}` matcher.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // System endpoints
        .route("/health", get(system::health))
        // Ingestion
        .route("/report", post(reports::submit_report))
        // Latest-state queries
        .route("/reports", get(reports::list_latest))
        .route("/reports/filter", get(reports::filter_latest))
        .route("/reports/{device_id}", get(reports::device_latest))
        // API documentation
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        // report dashboards are served from other origins
        .layer(CorsLayer::permissive())
        .with_state(state)
}
