//! Shared-secret access gate for the storage endpoints.
//!
//! Every guarded request must carry the configured secret in `X-API-Key`.
//! The check runs as route middleware, before any handler or store call.
//! Comparison is plain byte equality; there is no rate limiting or
//! credential rotation.

use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Admission check holding the process-wide API secret.
#[derive(Clone)]
pub struct AccessGate {
    secret: Arc<str>,
}

impl AccessGate {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Admit the request only if `provided` equals the configured secret.
    ///
    /// Compared byte for byte, so secrets outside visible ASCII still match
    /// when the client sends the same UTF-8 bytes.
    pub fn check(&self, provided: Option<&[u8]>) -> Result<(), AppError> {
        match provided {
            Some(key) if key == self.secret.as_bytes() => Ok(()),
            _ => Err(AppError::forbidden("Invalid API Key")),
        }
    }

    /// Raw credential bytes carried by `headers`.
    pub fn credential(headers: &HeaderMap) -> Option<&[u8]> {
        headers.get(API_KEY_HEADER).map(|value| value.as_bytes())
    }
}

/// Middleware rejecting requests that fail the [`AccessGate`] with 403.
pub async fn require_api_key(
    State(gate): State<AccessGate>,
    request: Request,
    next: Next,
) -> Response {
    let provided = AccessGate::credential(request.headers());
    if let Err(err) = gate.check(provided) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            header_present = provided.is_some(),
            "rejected request with invalid API key"
        );
        return err.into_response();
    }

    next.run(request).await
}
