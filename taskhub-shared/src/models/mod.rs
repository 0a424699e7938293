/// Database models for Taskhub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `status`: Task statuses ("new", "in progress", ...)
/// - `label`: Free-form task labels (many-to-many with tasks)
/// - `task`: Tasks, their label links and list filtering
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::user::{User, CreateUser};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "ivan".to_string(),
///     first_name: "Ivan".to_string(),
///     last_name: "Petrov".to_string(),
///     email: None,
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod label;
pub mod status;
pub mod task;
pub mod user;

/// Result of a delete that is guarded by references from tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was removed
    Deleted,

    /// The row is still referenced by at least one task and was kept
    InUse,

    /// No row with that ID exists
    NotFound,
}

/// Maps a foreign-key violation raised by the store to `DeleteOutcome::InUse`
///
/// The explicit reference checks run before every guarded delete; this
/// covers a task that gained the reference between the check and the delete.
pub(crate) fn delete_outcome(
    result: Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error>,
) -> Result<DeleteOutcome, sqlx::Error> {
    match result {
        Ok(done) if done.rows_affected() > 0 => Ok(DeleteOutcome::Deleted),
        Ok(_) => Ok(DeleteOutcome::NotFound),
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Ok(DeleteOutcome::InUse)
        }
        Err(e) => Err(e),
    }
}

/// Returns true if the error is a unique constraint violation
///
/// Used by the web layer to turn duplicate names into form errors.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
