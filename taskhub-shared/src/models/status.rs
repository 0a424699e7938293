/// Status model and database operations
///
/// Statuses are a free-standing lookup table ("new", "in progress", "done").
/// Every task references exactly one status, so a status cannot be deleted
/// while a task still uses it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE statuses (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL UNIQUE,
///     created_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use super::{delete_outcome, DeleteOutcome};

/// Task status
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    pub id: i64,

    /// Unique display name
    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Status {
    /// Creates a new status
    ///
    /// # Errors
    ///
    /// Returns a unique violation if a status with that name already exists
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Self, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            "INSERT INTO statuses (name) VALUES (?) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        debug!(status_id = status.id, "Status created");
        Ok(status)
    }

    /// Finds a status by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            "SELECT id, name, created_at FROM statuses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Lists all statuses ordered by ID
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let statuses = sqlx::query_as::<_, Status>(
            "SELECT id, name, created_at FROM statuses ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(statuses)
    }

    /// Renames a status
    ///
    /// # Returns
    ///
    /// The updated status, or None if it doesn't exist
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            "UPDATE statuses SET name = ? WHERE id = ? RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Returns true if any task uses this status
    pub async fn is_in_use(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE status_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(count > 0)
    }

    /// Deletes a status unless a task still uses it
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        if Self::is_in_use(pool, id).await? {
            return Ok(DeleteOutcome::InUse);
        }

        let result = sqlx::query("DELETE FROM statuses WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await;

        delete_outcome(result)
    }
}
