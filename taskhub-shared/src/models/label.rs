/// Label model and database operations
///
/// Labels are attached to tasks through the `task_labels` link table. A label
/// that is still attached to a task cannot be deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE labels (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL UNIQUE,
///     created_at TEXT NOT NULL
/// );
///
/// CREATE TABLE task_labels (
///     task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE RESTRICT,
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use super::{delete_outcome, DeleteOutcome};

/// Task label
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Label {
    /// Creates a new label
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Self, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "INSERT INTO labels (name) VALUES (?) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        debug!(label_id = label.id, "Label created");
        Ok(label)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at FROM labels WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at FROM labels ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(labels)
    }

    /// Lists the labels attached to a task, ordered by label ID
    pub async fn list_for_task(pool: &SqlitePool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>(
            r#"
            SELECT l.id, l.name, l.created_at
            FROM labels l
            JOIN task_labels tl ON tl.label_id = l.id
            WHERE tl.task_id = ?
            ORDER BY l.id
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(labels)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "UPDATE labels SET name = ? WHERE id = ? RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    /// Returns true if the label is attached to at least one task
    pub async fn is_in_use(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM task_labels WHERE label_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(count > 0)
    }

    /// Deletes a label unless a task still carries it
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        if Self::is_in_use(pool, id).await? {
            return Ok(DeleteOutcome::InUse);
        }

        let result = sqlx::query("DELETE FROM labels WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await;

        delete_outcome(result)
    }
}
