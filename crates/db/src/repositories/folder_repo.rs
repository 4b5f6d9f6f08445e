//! Repository for the `folders` table.

use leafnote_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::folder::FolderWithCount;

/// Column list for a folder plus its derived note count.
///
/// Expects the folder table to be aliased as `f`.
const COLUMNS_WITH_COUNT: &str = "f.id, f.name, f.created_at, f.updated_at, \
     (SELECT COUNT(*) FROM notes n WHERE n.folder_id = f.id) AS note_count";

/// Provides CRUD operations for folders.
pub struct FolderRepo;

impl FolderRepo {
    /// Insert a new folder, returning it with a note count of zero.
    pub async fn create(pool: &PgPool, name: &str) -> Result<FolderWithCount, sqlx::Error> {
        sqlx::query_as::<_, FolderWithCount>(
            "INSERT INTO folders (id, name)
             VALUES ($1, $2)
             RETURNING id, name, created_at, updated_at, 0::BIGINT AS note_count",
        )
        .bind(new_id())
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Find a folder by ID, with its note count.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FolderWithCount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS_WITH_COUNT} FROM folders f WHERE f.id = $1");
        sqlx::query_as::<_, FolderWithCount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all folders ordered by name, each with its note count.
    ///
    /// `COLLATE "C"` sorts by byte value regardless of the database locale.
    pub async fn list(pool: &PgPool) -> Result<Vec<FolderWithCount>, sqlx::Error> {
        let query = format!(
            r#"SELECT {COLUMNS_WITH_COUNT} FROM folders f ORDER BY f.name COLLATE "C" ASC, f.created_at ASC"#
        );
        sqlx::query_as::<_, FolderWithCount>(&query)
            .fetch_all(pool)
            .await
    }

    /// Rename a folder. A `None` name keeps the current one; `updated_at` is
    /// refreshed either way.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn rename(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
    ) -> Result<Option<FolderWithCount>, sqlx::Error> {
        let query = format!(
            "WITH updated AS (
                UPDATE folders SET
                    name = COALESCE($2, name),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, created_at, updated_at
             )
             SELECT {COLUMNS_WITH_COUNT} FROM updated f"
        );
        sqlx::query_as::<_, FolderWithCount>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a folder by ID. Returns `true` if a row was removed.
    ///
    /// Notes filed in the folder are unfiled by `ON DELETE SET NULL`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
