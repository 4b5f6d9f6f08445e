use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// No note is currently published under the requested share token.
    #[error("Shared note not found")]
    SharedNoteNotFound,
}
