//! Health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint (checks catalog store connectivity)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 500, description = "Catalog store unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn readiness_check(State(state): State<crate::AppState>) -> AppResult<Json<HealthResponse>> {
    state.services.ping().await?;

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
