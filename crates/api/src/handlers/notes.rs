//! Handlers for the `/notes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use leafnote_core::types::DbId;
use leafnote_db::models::note::{CreateNote, NewNote, NoteFilter, NoteWithFolder, UpdateNote};

use crate::error::{AppError, AppResult};
use crate::query::NoteListParams;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// GET /api/notes?search=&folderId=
///
/// Notes most recently updated first, each with its folder.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<NoteListParams>,
) -> AppResult<Json<Vec<NoteWithFolder>>> {
    let filter = NoteFilter::try_from(params)?;
    let notes = state.store.list_notes(&filter).await?;
    Ok(Json(notes))
}

/// POST /api/notes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateNote>,
) -> AppResult<(StatusCode, Json<NoteWithFolder>)> {
    let note = state.store.create_note(&NewNote::from(input)).await?;

    tracing::info!(
        note_id = %note.note.id,
        folder_id = ?note.note.folder_id,
        "Note created",
    );

    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<NoteWithFolder>> {
    let note = state
        .store
        .find_note(id)
        .await?
        .ok_or(AppError::not_found("Note", id))?;
    Ok(Json(note))
}

/// PATCH /api/notes/{id}
///
/// Only fields present in the body are applied; `folderId: null` unfiles.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNote>,
) -> AppResult<Json<NoteWithFolder>> {
    let note = state
        .store
        .update_note(id, &input)
        .await?
        .ok_or(AppError::not_found("Note", id))?;

    tracing::info!(
        note_id = %id,
        title = !input.title.is_unchanged(),
        content = !input.content.is_unchanged(),
        folder = !input.folder_id.is_unchanged(),
        "Note updated",
    );

    Ok(Json(note))
}

/// DELETE /api/notes/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SuccessResponse>> {
    if !state.store.delete_note(id).await? {
        return Err(AppError::not_found("Note", id));
    }

    tracing::info!(note_id = %id, "Note deleted");

    Ok(Json(SuccessResponse::OK))
}
