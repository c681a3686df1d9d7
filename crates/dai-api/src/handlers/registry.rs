//! Archive registry listing and detail pages.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use dai_core::{ArchiveDetail, RegistryEntry};

use crate::{auth::Auth, ApiError, AppState};

/// Records visible to the viewer, newest classification first.
#[utoipa::path(get, path = "/archive-registry", tag = "Registry",
    responses((status = 200, description = "Visible archive records", body = [RegistryEntry])))]
pub async fn list_registry(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<Json<Vec<RegistryEntry>>, ApiError> {
    Ok(Json(state.service.registry(&auth.viewer).await?))
}

/// Detail page. Hidden records answer 404 exactly like absent ones.
#[utoipa::path(get, path = "/archive-registry/{id}", tag = "Registry",
    params(("id" = Uuid, Path, description = "Archive record id")),
    responses(
        (status = 200, description = "Archive detail", body = ArchiveDetail),
        (status = 404, description = "Archive not found"),
    )
)]
pub async fn get_archive_detail(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<ArchiveDetail>, ApiError> {
    Ok(Json(state.service.detail(id, &auth.viewer).await?))
}
