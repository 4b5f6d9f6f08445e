//! Public view of a shared note.

use leafnote_core::defaults::display_title;
use leafnote_db::models::note::SharedNote;

use crate::api::{ClientError, NotesApi};

pub const SHARE_UNAVAILABLE: &str = "This note doesn't exist or is no longer shared.";
pub const SHARE_LOAD_ERROR: &str = "Something went wrong loading this note.";
pub const SHARE_NETWORK_ERROR: &str = "Failed to load note. Please try again.";

/// What the public share page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedNoteView {
    Loaded(SharedNote),
    Unavailable(&'static str),
}

impl SharedNoteView {
    /// Title to display, with "Untitled" standing in for an empty one.
    pub fn title(&self) -> Option<&str> {
        match self {
            SharedNoteView::Loaded(note) => Some(display_title(&note.title)),
            SharedNoteView::Unavailable(_) => None,
        }
    }
}

/// Fetch a shared note, degrading every failure to a readable message.
pub async fn resolve_shared_note<A: NotesApi + ?Sized>(api: &A, token: &str) -> SharedNoteView {
    match api.resolve_shared_note(token).await {
        Ok(note) => SharedNoteView::Loaded(note),
        Err(ClientError::NotFound(_)) => SharedNoteView::Unavailable(SHARE_UNAVAILABLE),
        Err(ClientError::Api { status, .. }) => {
            tracing::warn!(status, "Shared note request failed");
            SharedNoteView::Unavailable(SHARE_LOAD_ERROR)
        }
        Err(ClientError::Request(e)) => {
            tracing::warn!(error = %e, "Shared note request did not complete");
            SharedNoteView::Unavailable(SHARE_NETWORK_ERROR)
        }
    }
}

/// Public link for a share token.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/share/{token}", base_url.trim_end_matches('/'))
}
