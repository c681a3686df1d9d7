//! Archive notes page and note entry.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use dai_core::ArchiveNotesPage;

use crate::{auth::Auth, ApiError, AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotesQuery {
    /// Zero-based page number.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddNoteBody {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddNoteResponse {
    pub id: Uuid,
    pub archive_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[utoipa::path(get, path = "/archive-registry/{id}/notes", tag = "Notes",
    params(("id" = Uuid, Path, description = "Archive record id"), NotesQuery),
    responses(
        (status = 200, description = "Notes page", body = ArchiveNotesPage),
        (status = 403, description = "Archive view permission required"),
        (status = 404, description = "Archive not found"),
    )
)]
pub async fn get_notes_page(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<ArchiveNotesPage>, ApiError> {
    let page = state
        .service
        .notes_page(id, &auth.viewer, query.page, query.limit)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(post, path = "/archive-registry/{id}/notes", tag = "Notes",
    params(("id" = Uuid, Path, description = "Archive record id")),
    request_body = AddNoteBody,
    responses(
        (status = 201, description = "Note added", body = AddNoteResponse),
        (status = 400, description = "Empty or over-long note text"),
        (status = 403, description = "Archive management permission required"),
        (status = 404, description = "Archive not found"),
    )
)]
pub async fn add_note(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<AddNoteBody>,
) -> Result<(StatusCode, Json<AddNoteResponse>), ApiError> {
    let note = state.service.add_note(id, &auth.viewer, &body.text).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddNoteResponse {
            id: note.id,
            archive_id: note.archive_id,
            created_at: note.created_at,
        }),
    ))
}
