use leafnote_core::types::DbId;

/// Failures reported by a [`NotesStore`](crate::NotesStore).
///
/// A missing row is not an error: lookups return `Ok(None)` and deletes
/// return `Ok(false)` so the caller decides which entity was not found.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection, query, or constraint failure from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The share token is already assigned to another note.
    #[error("Share token already in use")]
    DuplicateShareToken,

    /// A note references a folder that does not exist.
    #[error("Folder with id {0} not found")]
    FolderNotFound(DbId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// PostgreSQL error codes the store translates.
pub(crate) mod pg_codes {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
}
