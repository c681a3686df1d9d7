//! Audit CSV export.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
};

use dai_core::defaults::{CSV_CACHE_CONTROL, CSV_CONTENT_TYPE};
use dai_core::Permission;

use crate::{auth::Auth, ApiError, AppState};

/// Every record regardless of status, as a 24-column CSV download.
#[utoipa::path(get, path = "/admin/archive-audit/export", tag = "Audit",
    responses(
        (status = 200, description = "Audit CSV", body = String, content_type = "text/csv"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Archive management permission required"),
    )
)]
pub async fn export_audit_csv(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Permission::ManageArchives)?;

    let export = state.service.audit_export().await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.filename
    ))
    .map_err(|e| ApiError::Internal(dai_core::Error::Internal(e.to_string())))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CSV_CACHE_CONTROL));

    Ok((headers, export.body))
}
