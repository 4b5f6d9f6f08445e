//! Handlers for issuing, revoking and resolving public share links.

use axum::extract::{Path, State};
use axum::Json;
use leafnote_core::error::CoreError;
use leafnote_core::share_token::{generate_share_token, is_well_formed, MAX_GENERATION_ATTEMPTS};
use leafnote_core::types::DbId;
use leafnote_db::models::note::{SharedNote, ShareTokenResponse};
use leafnote_db::StoreError;

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// POST /api/notes/{id}/share
///
/// Idempotent: a note that already has a token keeps it.
pub async fn issue(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ShareTokenResponse>> {
    if let Some(share_token) = current_token(&state, id).await? {
        return Ok(Json(ShareTokenResponse { share_token }));
    }

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let candidate = generate_share_token();
        match state.store.assign_share_token(id, &candidate).await {
            Ok(true) => {
                tracing::info!(note_id = %id, "Share link issued");
                return Ok(Json(ShareTokenResponse {
                    share_token: candidate,
                }));
            }
            // Lost a race with a concurrent issue; the winner's token stands
            // unless it was revoked in the meantime.
            Ok(false) => {
                if let Some(share_token) = current_token(&state, id).await? {
                    return Ok(Json(ShareTokenResponse { share_token }));
                }
                tracing::warn!(note_id = %id, attempt, "Share token revoked during issue, retrying");
            }
            Err(StoreError::DuplicateShareToken) => {
                tracing::warn!(note_id = %id, attempt, "Share token collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::InternalError(format!(
        "could not allocate a unique share token for note {id}"
    )))
}

/// DELETE /api/notes/{id}/share
pub async fn revoke(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SuccessResponse>> {
    if !state.store.clear_share_token(id).await? {
        return Err(AppError::not_found("Note", id));
    }

    tracing::info!(note_id = %id, "Share link revoked");

    Ok(Json(SuccessResponse::OK))
}

/// GET /api/shared/{token}
///
/// Public read-only projection of a shared note.
pub async fn resolve(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<SharedNote>> {
    if !is_well_formed(&token) {
        return Err(CoreError::SharedNoteNotFound.into());
    }

    let note = state
        .store
        .find_shared_note(&token)
        .await?
        .ok_or(CoreError::SharedNoteNotFound)?;
    Ok(Json(note))
}

/// The note's current token, or NotFound when the note does not exist.
async fn current_token(state: &AppState, id: DbId) -> AppResult<Option<String>> {
    state
        .store
        .find_share_token(id)
        .await?
        .ok_or(AppError::not_found("Note", id))
}
