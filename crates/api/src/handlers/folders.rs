//! Handlers for the `/folders` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use leafnote_core::defaults::{folder_name_or_default, requested_folder_name};
use leafnote_core::types::DbId;
use leafnote_db::models::folder::{CreateFolder, FolderWithCount, UpdateFolder};

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// GET /api/folders
///
/// All folders ordered by name, each with its note count.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<FolderWithCount>>> {
    let folders = state.store.list_folders().await?;
    Ok(Json(folders))
}

/// POST /api/folders
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFolder>,
) -> AppResult<(StatusCode, Json<FolderWithCount>)> {
    let name = folder_name_or_default(input.name.as_deref());
    let folder = state.store.create_folder(&name).await?;

    tracing::info!(folder_id = %folder.folder.id, "Folder created");

    Ok((StatusCode::CREATED, Json(folder)))
}

/// PATCH /api/folders/{id}
///
/// Rename a folder. A missing or blank name only refreshes `updatedAt`.
pub async fn rename(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFolder>,
) -> AppResult<Json<FolderWithCount>> {
    let name = requested_folder_name(input.name.as_deref());
    let folder = state
        .store
        .rename_folder(id, name)
        .await?
        .ok_or(AppError::not_found("Folder", id))?;

    tracing::info!(folder_id = %id, "Folder renamed");

    Ok(Json(folder))
}

/// DELETE /api/folders/{id}
///
/// Notes filed in the folder are kept and become unfiled.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SuccessResponse>> {
    if !state.store.delete_folder(id).await? {
        return Err(AppError::not_found("Folder", id));
    }

    tracing::info!(folder_id = %id, "Folder deleted");

    Ok(Json(SuccessResponse::OK))
}
