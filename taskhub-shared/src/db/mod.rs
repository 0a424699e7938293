/// Database layer for Taskhub
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - `migrations`: Embedded migration runner
/// - Models are in the `models` module at crate root level

pub mod migrations;
pub mod pool;
