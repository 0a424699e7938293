//! # Taskhub Shared Library
//!
//! Domain types, persistence and authentication used by the Taskhub web
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Users, statuses, labels and tasks with their queries
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing, session tokens and permission checks
//! - `flash`: One-shot notification messages

pub mod auth;
pub mod db;
pub mod flash;
pub mod models;

/// Current version of the Taskhub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
