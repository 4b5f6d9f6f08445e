//! Folder entity model and DTOs.

use leafnote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `folders` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A folder annotated with the number of notes filed in it.
///
/// The count is computed at query time and never stored.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub folder: Folder,
    pub note_count: i64,
}

/// DTO for creating a folder. A missing or blank name becomes "New Folder".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateFolder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// DTO for renaming a folder. A missing or blank name keeps the current one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateFolder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_with_count_serializes_flat_camel_case() {
        let now = chrono::Utc::now();
        let folder = FolderWithCount {
            folder: Folder {
                id: uuid::Uuid::nil(),
                name: "Work".into(),
                created_at: now,
                updated_at: now,
            },
            note_count: 3,
        };

        let json = serde_json::to_value(&folder).unwrap();
        assert_eq!(json["name"], "Work");
        assert_eq!(json["noteCount"], 3);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("folder").is_none());
    }

    #[test]
    fn create_folder_accepts_empty_body() {
        let input: CreateFolder = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
    }
}
