/// User model and database operations
///
/// Users register themselves, may only edit or delete their own account, and
/// cannot be deleted while any task references them as author or executor.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     username TEXT NOT NULL UNIQUE,
///     first_name TEXT NOT NULL DEFAULT '',
///     last_name TEXT NOT NULL DEFAULT '',
///     email TEXT,
///     password_hash TEXT NOT NULL,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::user::{User, CreateUser};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "ivan".to_string(),
///     first_name: "Ivan".to_string(),
///     last_name: "Petrov".to_string(),
///     email: Some("ivan@example.com".to_string()),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "ivan").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use super::{delete_outcome, DeleteOutcome};

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    /// Optional contact address
    pub email: Option<String>,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// New email (use Some(None) to clear)
    pub email: Option<Option<String>>,

    /// New password hash
    pub password_hash: Option<String>,
}

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, password_hash, created_at";

/// Display name: "First Last", falling back to the username
pub fn display_name(username: &str, first_name: &str, last_name: &str) -> String {
    let full = format!("{} {}", first_name.trim(), last_name.trim());
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

impl User {
    pub fn full_name(&self) -> String {
        display_name(&self.username, &self.first_name, &self.last_name)
    }

    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, first_name, last_name, email, password_hash)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        debug!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users ordered by ID
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE users SET id = id");

        if let Some(username) = data.username {
            builder.push(", username = ").push_bind(username);
        }
        if let Some(first_name) = data.first_name {
            builder.push(", first_name = ").push_bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            builder.push(", last_name = ").push_bind(last_name);
        }
        if let Some(email) = data.email {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            builder.push(", password_hash = ").push_bind(password_hash);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {USER_COLUMNS}"));

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Returns true if any task has this user as author or executor
    pub async fn is_referenced_by_tasks(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE author_id = ? OR executor_id = ?",
        )
        .bind(id)
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Deletes a user unless a task still references it
    ///
    /// Returns `DeleteOutcome::InUse` instead of surfacing the store's
    /// foreign-key error.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        if Self::is_referenced_by_tasks(pool, id).await? {
            debug!(user_id = id, "User is referenced by tasks, refusing delete");
            return Ok(DeleteOutcome::InUse);
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await;

        delete_outcome(result)
    }

    /// Counts total number of users
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
