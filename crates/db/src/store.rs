//! The data-access interface used by the notes service.

use async_trait::async_trait;
use leafnote_core::types::DbId;

use crate::error::StoreResult;
use crate::models::folder::FolderWithCount;
use crate::models::note::{NewNote, NoteFilter, NoteWithFolder, SharedNote, UpdateNote};

/// Persistence for folders and notes.
///
/// Every method is a single atomic operation against the store. Concurrent
/// writes to the same row are last-write-wins.
#[async_trait]
pub trait NotesStore: Send + Sync {
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    // -- Folders ----------------------------------------------------------

    /// All folders ordered by name, each with its current note count.
    async fn list_folders(&self) -> StoreResult<Vec<FolderWithCount>>;

    async fn find_folder(&self, id: DbId) -> StoreResult<Option<FolderWithCount>>;

    /// Insert a folder with an already-resolved name.
    async fn create_folder(&self, name: &str) -> StoreResult<FolderWithCount>;

    /// Rename a folder and refresh `updated_at`. `None` keeps the name.
    ///
    /// Returns `None` if no folder has the given id.
    async fn rename_folder(
        &self,
        id: DbId,
        name: Option<&str>,
    ) -> StoreResult<Option<FolderWithCount>>;

    /// Remove a folder. Notes filed in it become unfiled.
    async fn delete_folder(&self, id: DbId) -> StoreResult<bool>;

    // -- Notes ------------------------------------------------------------

    /// Notes matching `filter`, most recently updated first.
    async fn list_notes(&self, filter: &NoteFilter) -> StoreResult<Vec<NoteWithFolder>>;

    async fn find_note(&self, id: DbId) -> StoreResult<Option<NoteWithFolder>>;

    async fn create_note(&self, input: &NewNote) -> StoreResult<NoteWithFolder>;

    /// Apply the fields present in `input` and refresh `updated_at`.
    ///
    /// Returns `None` if no note has the given id.
    async fn update_note(&self, id: DbId, input: &UpdateNote)
        -> StoreResult<Option<NoteWithFolder>>;

    async fn delete_note(&self, id: DbId) -> StoreResult<bool>;

    // -- Sharing ----------------------------------------------------------

    /// The note's current share token. Outer `None` means the note does not exist.
    async fn find_share_token(&self, note_id: DbId) -> StoreResult<Option<Option<String>>>;

    /// Set the share token only if the note has none.
    ///
    /// Returns `false` if the note is missing or already shared. Fails with
    /// [`StoreError::DuplicateShareToken`](crate::StoreError::DuplicateShareToken)
    /// if another note holds `token`. Does not touch `updated_at`.
    async fn assign_share_token(&self, note_id: DbId, token: &str) -> StoreResult<bool>;

    /// Clear the share token. Returns `false` if the note does not exist.
    async fn clear_share_token(&self, note_id: DbId) -> StoreResult<bool>;

    /// The public projection of the note currently shared under `token`.
    async fn find_shared_note(&self, token: &str) -> StoreResult<Option<SharedNote>>;
}
