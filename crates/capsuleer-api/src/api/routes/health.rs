//! Health route handler

use crate::api::types::HealthCheckResponse;
use axum::Json;

/// Basic health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthCheckResponse),
    ),
    tag = "health",
)]
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        message: "Capsuleer API is running".to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now(),
    })
}
