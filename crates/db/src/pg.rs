//! [`NotesStore`] backed by PostgreSQL.

use async_trait::async_trait;
use leafnote_core::types::DbId;

use crate::error::{pg_codes, StoreError, StoreResult};
use crate::models::folder::FolderWithCount;
use crate::models::note::{NewNote, NoteFilter, NoteWithFolder, SharedNote, UpdateNote};
use crate::repositories::{FolderRepo, NoteRepo};
use crate::store::NotesStore;
use crate::DbPool;

const SHARE_TOKEN_CONSTRAINT: &str = "uq_notes_share_token";
const FOLDER_FK_CONSTRAINT: &str = "fk_notes_folder_id";

/// Postgres store. Cheap to clone (the pool is reference counted).
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Whether `err` is a violation of the named constraint with the given code.
fn violates(err: &sqlx::Error, code: &str, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(code) && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Translate a foreign key failure on `notes.folder_id` into `FolderNotFound`.
fn map_folder_fk(err: sqlx::Error, folder_id: Option<DbId>) -> StoreError {
    match folder_id {
        Some(id) if violates(&err, pg_codes::FOREIGN_KEY_VIOLATION, FOLDER_FK_CONSTRAINT) => {
            StoreError::FolderNotFound(id)
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl NotesStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_folders(&self) -> StoreResult<Vec<FolderWithCount>> {
        Ok(FolderRepo::list(&self.pool).await?)
    }

    async fn find_folder(&self, id: DbId) -> StoreResult<Option<FolderWithCount>> {
        Ok(FolderRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_folder(&self, name: &str) -> StoreResult<FolderWithCount> {
        Ok(FolderRepo::create(&self.pool, name).await?)
    }

    async fn rename_folder(
        &self,
        id: DbId,
        name: Option<&str>,
    ) -> StoreResult<Option<FolderWithCount>> {
        Ok(FolderRepo::rename(&self.pool, id, name).await?)
    }

    async fn delete_folder(&self, id: DbId) -> StoreResult<bool> {
        Ok(FolderRepo::delete(&self.pool, id).await?)
    }

    async fn list_notes(&self, filter: &NoteFilter) -> StoreResult<Vec<NoteWithFolder>> {
        Ok(NoteRepo::list(&self.pool, filter).await?)
    }

    async fn find_note(&self, id: DbId) -> StoreResult<Option<NoteWithFolder>> {
        Ok(NoteRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_note(&self, input: &NewNote) -> StoreResult<NoteWithFolder> {
        NoteRepo::create(&self.pool, input)
            .await
            .map_err(|e| map_folder_fk(e, input.folder_id))
    }

    async fn update_note(
        &self,
        id: DbId,
        input: &UpdateNote,
    ) -> StoreResult<Option<NoteWithFolder>> {
        NoteRepo::update(&self.pool, id, input)
            .await
            .map_err(|e| map_folder_fk(e, input.folder_id.value().copied()))
    }

    async fn delete_note(&self, id: DbId) -> StoreResult<bool> {
        Ok(NoteRepo::delete(&self.pool, id).await?)
    }

    async fn find_share_token(&self, note_id: DbId) -> StoreResult<Option<Option<String>>> {
        Ok(NoteRepo::find_share_token(&self.pool, note_id).await?)
    }

    async fn assign_share_token(&self, note_id: DbId, token: &str) -> StoreResult<bool> {
        NoteRepo::assign_share_token(&self.pool, note_id, token)
            .await
            .map_err(|e| {
                if violates(&e, pg_codes::UNIQUE_VIOLATION, SHARE_TOKEN_CONSTRAINT) {
                    StoreError::DuplicateShareToken
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn clear_share_token(&self, note_id: DbId) -> StoreResult<bool> {
        Ok(NoteRepo::clear_share_token(&self.pool, note_id).await?)
    }

    async fn find_shared_note(&self, token: &str) -> StoreResult<Option<SharedNote>> {
        Ok(NoteRepo::find_shared(&self.pool, token).await?)
    }
}
