//! Repository for the `notes` table.

use leafnote_core::types::{new_id, DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::folder::Folder;
use crate::models::note::{NewNote, Note, NoteFilter, NoteWithFolder, SharedNote, UpdateNote};

/// Note columns plus the owning folder's columns from a `LEFT JOIN`.
///
/// Expects the note table aliased as `n` and the folder table as `f`.
const COLUMNS_WITH_FOLDER: &str = "n.id, n.title, n.content, n.folder_id, n.share_token, \
     n.created_at, n.updated_at, \
     f.name AS folder_name, f.created_at AS folder_created_at, f.updated_at AS folder_updated_at";

/// Columns of the public shared-note projection.
const SHARED_COLUMNS: &str = "id, title, content, created_at, updated_at";

/// A note row joined with its (optional) folder.
#[derive(FromRow)]
struct NoteFolderRow {
    #[sqlx(flatten)]
    note: Note,
    folder_name: Option<String>,
    folder_created_at: Option<Timestamp>,
    folder_updated_at: Option<Timestamp>,
}

impl From<NoteFolderRow> for NoteWithFolder {
    fn from(row: NoteFolderRow) -> Self {
        let folder = match (
            row.note.folder_id,
            row.folder_name,
            row.folder_created_at,
            row.folder_updated_at,
        ) {
            (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(Folder {
                id,
                name,
                created_at,
                updated_at,
            }),
            _ => None,
        };
        NoteWithFolder {
            note: row.note,
            folder,
        }
    }
}

/// Escape `LIKE` metacharacters and wrap the term for a substring match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Provides CRUD and sharing operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new note, returning it with its folder.
    pub async fn create(pool: &PgPool, input: &NewNote) -> Result<NoteWithFolder, sqlx::Error> {
        let query = format!(
            "WITH n AS (
                INSERT INTO notes (id, title, content, folder_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {COLUMNS_WITH_FOLDER} FROM n LEFT JOIN folders f ON f.id = n.folder_id"
        );
        sqlx::query_as::<_, NoteFolderRow>(&query)
            .bind(new_id())
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.folder_id)
            .fetch_one(pool)
            .await
            .map(NoteWithFolder::from)
    }

    /// Find a note by ID, with its folder.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<NoteWithFolder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_WITH_FOLDER}
             FROM notes n LEFT JOIN folders f ON f.id = n.folder_id
             WHERE n.id = $1"
        );
        let row = sqlx::query_as::<_, NoteFolderRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(NoteWithFolder::from))
    }

    /// List notes matching `filter`, most recently updated first.
    ///
    /// `search` is a case-insensitive substring match on title or content.
    pub async fn list(
        pool: &PgPool,
        filter: &NoteFilter,
    ) -> Result<Vec<NoteWithFolder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_WITH_FOLDER}
             FROM notes n LEFT JOIN folders f ON f.id = n.folder_id
             WHERE ($1::TEXT IS NULL OR n.title ILIKE $1 OR n.content ILIKE $1)
               AND ($2::UUID IS NULL OR n.folder_id = $2)
             ORDER BY n.updated_at DESC, n.id DESC"
        );
        let pattern = filter.search.as_deref().map(contains_pattern);
        let rows = sqlx::query_as::<_, NoteFolderRow>(&query)
            .bind(pattern)
            .bind(filter.folder_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(NoteWithFolder::from).collect())
    }

    /// Update a note. Only fields present in `input` are applied and
    /// `updated_at` is always refreshed.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateNote,
    ) -> Result<Option<NoteWithFolder>, sqlx::Error> {
        // folder_id is nullable, so "absent" and "null" need a separate flag.
        let folder_provided = !input.folder_id.is_unchanged();
        let folder_value = input.folder_id.value().copied();

        let query = format!(
            "WITH n AS (
                UPDATE notes SET
                    title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    folder_id = CASE WHEN $4::BOOLEAN THEN $5::UUID ELSE folder_id END,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS_WITH_FOLDER} FROM n LEFT JOIN folders f ON f.id = n.folder_id"
        );
        let row = sqlx::query_as::<_, NoteFolderRow>(&query)
            .bind(id)
            .bind(input.title.value().map(String::as_str))
            .bind(input.content.value().map(String::as_str))
            .bind(folder_provided)
            .bind(folder_value)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(NoteWithFolder::from))
    }

    /// Delete a note by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The current share token of a note. Outer `None` if the note is missing.
    pub async fn find_share_token(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT share_token FROM notes WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(token,)| token))
    }

    /// Set the share token if the note has none. Returns `true` if it was set.
    ///
    /// Leaves `updated_at` untouched.
    pub async fn assign_share_token(
        pool: &PgPool,
        id: DbId,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notes SET share_token = $2 WHERE id = $1 AND share_token IS NULL")
                .bind(id)
                .bind(token)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the share token. Returns `true` if the note exists.
    pub async fn clear_share_token(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE notes SET share_token = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the public projection of the note shared under `token`.
    pub async fn find_shared(pool: &PgPool, token: &str) -> Result<Option<SharedNote>, sqlx::Error> {
        let query = format!("SELECT {SHARED_COLUMNS} FROM notes WHERE share_token = $1");
        sqlx::query_as::<_, SharedNote>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }
}
