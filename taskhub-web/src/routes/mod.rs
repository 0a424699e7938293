/// Route handlers
///
/// Organized by resource:
///
/// - `index`: Home page
/// - `health`: Health check endpoint
/// - `auth`: Login and logout
/// - `users`: Registration and account management
/// - `statuses`, `labels`: Reference data for tasks
/// - `tasks`: Task CRUD and filtered listing

pub mod auth;
pub mod health;
pub mod index;
pub mod labels;
pub mod statuses;
pub mod tasks;
pub mod users;
