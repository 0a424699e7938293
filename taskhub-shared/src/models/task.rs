/// Task model and database operations
///
/// A task always has a status and an author. The author is the user who
/// created it and never changes afterwards; the executor is optional. Labels
/// are attached through `task_labels`, which is rewritten as a whole whenever
/// the task is saved.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status_id INTEGER NOT NULL REFERENCES statuses(id) ON DELETE RESTRICT,
///     author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     executor_id INTEGER REFERENCES users(id) ON DELETE RESTRICT,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::task::{CreateTask, Task, TaskFilter, TaskView};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     name: "Write release notes".to_string(),
///     description: String::new(),
///     status_id: 1,
///     author_id: 1,
///     executor_id: Some(2),
///     label_ids: vec![1, 3],
/// }).await?;
///
/// // Tasks in status 1 that carry label 3
/// let filter = TaskFilter {
///     status_id: Some(1),
///     label_id: Some(3),
///     ..Default::default()
/// };
/// let tasks = TaskView::list(&pool, &filter).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use tracing::debug;

use super::user::display_name;

/// Task row as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status_id: i64,

    /// User who created the task
    pub author_id: i64,

    /// User assigned to carry out the task
    pub executor_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub status_id: i64,

    /// Always the requesting user
    pub author_id: i64,

    pub executor_id: Option<i64>,
    pub label_ids: Vec<i64>,
}

/// Input for updating a task
///
/// The author is deliberately absent: it is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub name: String,
    pub description: String,
    pub status_id: i64,
    pub executor_id: Option<i64>,
    pub label_ids: Vec<i64>,
}

/// Conjunctive task list filter
///
/// Every criterion that is `Some` must hold; `None` criteria are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status_id: Option<i64>,
    pub executor_id: Option<i64>,

    /// Task must carry this label (among possibly others)
    pub label_id: Option<i64>,

    /// Task must have been created by this user
    pub author_id: Option<i64>,
}

impl TaskFilter {
    /// True if no criterion is set
    pub fn is_empty(&self) -> bool {
        self.status_id.is_none()
            && self.executor_id.is_none()
            && self.label_id.is_none()
            && self.author_id.is_none()
    }
}

/// Task joined with the names of its status, author and executor
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status_id: i64,
    pub status_name: String,
    pub author_id: i64,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub executor_id: Option<i64>,
    pub executor_username: Option<String>,
    pub executor_first_name: Option<String>,
    pub executor_last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str =
    "id, name, description, status_id, author_id, executor_id, created_at";

const TASK_VIEW_SELECT: &str = r#"
    SELECT t.id, t.name, t.description,
           t.status_id, s.name AS status_name,
           t.author_id, a.username AS author_username,
           a.first_name AS author_first_name, a.last_name AS author_last_name,
           t.executor_id, e.username AS executor_username,
           e.first_name AS executor_first_name, e.last_name AS executor_last_name,
           t.created_at
    FROM tasks t
    JOIN statuses s ON s.id = t.status_id
    JOIN users a ON a.id = t.author_id
    LEFT JOIN users e ON e.id = t.executor_id
"#;

impl TaskView {
    pub fn author_name(&self) -> String {
        display_name(
            &self.author_username,
            &self.author_first_name,
            &self.author_last_name,
        )
    }

    /// Executor display name, None when the task is unassigned
    pub fn executor_name(&self) -> Option<String> {
        self.executor_username.as_deref().map(|username| {
            display_name(
                username,
                self.executor_first_name.as_deref().unwrap_or_default(),
                self.executor_last_name.as_deref().unwrap_or_default(),
            )
        })
    }

    /// Finds one task with its joined names
    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, TaskView>(&format!("{TASK_VIEW_SELECT} WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists tasks matching every criterion of `filter`, ordered by ID
    pub async fn list(pool: &SqlitePool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(TASK_VIEW_SELECT);
        builder.push(" WHERE 1 = 1");

        if let Some(status_id) = filter.status_id {
            builder.push(" AND t.status_id = ").push_bind(status_id);
        }
        if let Some(executor_id) = filter.executor_id {
            builder.push(" AND t.executor_id = ").push_bind(executor_id);
        }
        if let Some(label_id) = filter.label_id {
            builder
                .push(" AND EXISTS (SELECT 1 FROM task_labels tl WHERE tl.task_id = t.id AND tl.label_id = ")
                .push_bind(label_id)
                .push(")");
        }
        if let Some(author_id) = filter.author_id {
            builder.push(" AND t.author_id = ").push_bind(author_id);
        }

        builder.push(" ORDER BY t.id");

        debug!(?filter, "Listing tasks");

        let tasks = builder
            .build_query_as::<TaskView>()
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }
}

impl Task {
    /// Creates a task and attaches its labels in one transaction
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (name, description, status_id, author_id, executor_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.status_id)
        .bind(data.author_id)
        .bind(data.executor_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_labels(&mut tx, task.id, &data.label_ids).await?;
        tx.commit().await?;

        debug!(task_id = task.id, author_id = task.author_id, "Task created");
        Ok(task)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Label IDs attached to a task
    pub async fn label_ids(pool: &SqlitePool, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT label_id FROM task_labels WHERE task_id = ? ORDER BY label_id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Updates a task and replaces its label set
    ///
    /// # Returns
    ///
    /// The updated task, or None if it doesn't exist
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET name = ?, description = ?, status_id = ?, executor_id = ?
            WHERE id = ?
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.status_id)
        .bind(data.executor_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        replace_labels(&mut tx, task.id, &data.label_ids).await?;
        tx.commit().await?;

        Ok(Some(task))
    }

    /// Deletes a task; its label links go with it
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

/// Rewrites the label set of a task, ignoring duplicate IDs
async fn replace_labels(
    conn: &mut SqliteConnection,
    task_id: i64,
    label_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM task_labels WHERE task_id = ?")
        .bind(task_id)
        .execute(&mut *conn)
        .await?;

    let unique: BTreeSet<i64> = label_ids.iter().copied().collect();
    for label_id in unique {
        sqlx::query("INSERT INTO task_labels (task_id, label_id) VALUES (?, ?)")
            .bind(task_id)
            .bind(label_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
