/// Middleware for the web server
///
/// - `context`: session and flash loading into `RequestContext`
/// - `security`: browser hardening headers

pub mod context;
pub mod security;
