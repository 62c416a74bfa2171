//! Unauthenticated service endpoints.
//!
//! - GET /         -> greeting envelope
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the configured bucket is reachable

use crate::{models::envelope::ApiResponse, services::storage_service::StorageService};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /`
pub async fn root() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Hello World"))
}

/// `GET /healthz`
///
/// Liveness check; always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            error: None,
        }),
    )
}

/// `GET /readyz`
///
/// Readiness check that asks the store whether the bucket is reachable.
/// HTTP 200 when it is, HTTP 503 with the store's message otherwise.
pub async fn readyz(State(service): State<StorageService>) -> impl IntoResponse {
    match service.check_ready().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".into(),
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "error".into(),
                error: Some(err.to_string()),
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
