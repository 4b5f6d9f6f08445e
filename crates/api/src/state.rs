use std::sync::Arc;

use leafnote_db::NotesStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; the store sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Folder and note persistence.
    pub store: Arc<dyn NotesStore>,
}
