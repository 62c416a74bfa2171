//! Defines routes for the gateway's object operations.
//!
//! ## Structure
//! - **Service endpoints** (no credential)
//!   - `GET    /`        — greeting
//!   - `GET    /healthz` — liveness
//!   - `GET    /readyz`  — bucket reachability
//!
//! - **Object endpoints** (require `X-API-Key`)
//!   - `GET    /s3/objects`         — list every object
//!   - `POST   /s3/upload?key=`     — upload multipart field `file`
//!   - `GET    /s3/download/{*key}` — download raw bytes
//!   - `DELETE /s3/delete/{*key}`   — delete object
//!
//! The wildcard `*key` allows nested keys like `photos/2025/img.jpg`.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz, root},
        object_handlers::{delete_object, download_object, list_objects, upload_object},
    },
    middleware::auth::{AccessGate, require_api_key},
    services::storage_service::StorageService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build and return the gateway router.
///
/// The access gate is attached with `route_layer`, so it runs for every
/// matched object route before the handler extracts the body or touches the
/// store. Every request, including rejected ones, is traced at `info`. The
/// router carries shared state (`StorageService`) to all handlers.
pub fn routes(gate: AccessGate, max_upload_bytes: usize) -> Router<StorageService> {
    let objects = Router::new()
        .route("/objects", get(list_objects))
        .route("/upload", post(upload_object))
        .route("/download/{*key}", get(download_object))
        .route("/delete/{*key}", delete(delete_object))
        .route_layer(middleware::from_fn_with_state(gate, require_api_key))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/s3", objects)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
