//! Note entity model and DTOs.

use leafnote_core::defaults::note_title_or_default;
use leafnote_core::patch::Patch;
use leafnote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::folder::Folder;

/// A row from the `notes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: DbId,
    pub title: String,
    /// Opaque HTML produced by the rich-text editor.
    pub content: String,
    pub folder_id: Option<DbId>,
    pub share_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A note together with the folder it is filed in, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteWithFolder {
    #[serde(flatten)]
    pub note: Note,
    pub folder: Option<Folder>,
}

/// Read-only projection served to anonymous readers of a shared note.
///
/// Deliberately carries no folder or token information.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedNote {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a note. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<DbId>,
}

/// A note ready for insertion, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub folder_id: Option<DbId>,
}

impl From<CreateNote> for NewNote {
    fn from(input: CreateNote) -> Self {
        Self {
            title: note_title_or_default(input.title.as_deref()),
            content: input.content.unwrap_or_default(),
            folder_id: input.folder_id,
        }
    }
}

/// DTO for partially updating a note.
///
/// `title` and `content` are non-nullable: `null` leaves them unchanged.
/// `folder_id: null` unfiles the note.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub content: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub folder_id: Patch<DbId>,
}

impl UpdateNote {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Patch::Value(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Patch::Value(content.into()),
            ..Default::default()
        }
    }

    pub fn move_to(folder_id: Option<DbId>) -> Self {
        Self {
            folder_id: folder_id.into(),
            ..Default::default()
        }
    }
}

/// Filters for listing notes. Both filters compose with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    /// Case-insensitive substring matched against title or content.
    pub search: Option<String>,
    pub folder_id: Option<DbId>,
}

impl NoteFilter {
    /// Build a filter, treating an empty search string as no search.
    pub fn new(search: Option<String>, folder_id: Option<DbId>) -> Self {
        Self {
            search: search.filter(|s| !s.is_empty()),
            folder_id,
        }
    }
}

/// Share issuance response (`{ "shareToken": ... }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTokenResponse {
    pub share_token: String,
}
