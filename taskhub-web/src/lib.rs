//! # Taskhub Web Server Library
//!
//! Server-rendered task tracker built on Axum.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error type and HTTP response mapping
//! - `forms`: Form and query-string parsing with validation
//! - `guard`: Permission enforcement
//! - `middleware`: Request context and security headers
//! - `routes`: Route handlers
//! - `session`: Request context, cookies and redirects
//! - `views`: HTML rendering

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod guard;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod views;
