//! HTTP handlers for dai-api.

pub mod audit;
pub mod notes;
pub mod registry;

use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service is healthy")))]
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve the generated OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(crate::ApiDoc::openapi())
}
