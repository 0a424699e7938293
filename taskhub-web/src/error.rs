/// Error handling for the web server
///
/// Handlers return `WebResult<T>`. Errors that the user can recover from are
/// turned into redirects carrying a flash message; everything else becomes
/// a plain error page.
///
/// # Example
///
/// ```
/// use taskhub_web::error::{WebError, WebResult};
///
/// fn find(id: i64) -> WebResult<i64> {
///     if id < 0 {
///         return Err(WebError::NotFound("Task not found".to_string()));
///     }
///     Ok(id)
/// }
/// ```

use crate::session::{flash_cookie, redirect, set_cookie, LOGIN_URL};
use crate::views;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;
use taskhub_shared::{
    auth::{password::PasswordError, session::SessionError},
    flash::FlashMessage,
};

/// Prompt shown on the login page after an anonymous request was refused
pub const LOGIN_PROMPT: &str = "Вы не авторизованы! Пожалуйста, выполните вход.";

/// Web result type alias
pub type WebResult<T> = Result<T, WebError>;

/// Unified web error type
#[derive(Debug)]
pub enum WebError {
    /// Not found (404)
    NotFound(String),

    /// No user is signed in: redirect to the login page
    Unauthenticated,

    /// Signed in but not permitted: redirect with an error message
    Forbidden {
        redirect_to: String,
        message: String,
    },

    /// Bad request (400)
    BadRequest(String),

    /// Internal server error (500)
    Internal(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::NotFound(msg) => write!(f, "Not found: {}", msg),
            WebError::Unauthenticated => write!(f, "Unauthenticated"),
            WebError::Forbidden { message, .. } => write!(f, "Forbidden: {}", message),
            WebError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            WebError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Unauthenticated => {
                let mut response = redirect(LOGIN_URL);
                if let Some(cookie) = flash_cookie(&[FlashMessage::error(LOGIN_PROMPT)]) {
                    set_cookie(&mut response, &cookie);
                }
                response
            }
            WebError::Forbidden {
                redirect_to,
                message,
            } => {
                let mut response = redirect(&redirect_to);
                if let Some(cookie) = flash_cookie(&[FlashMessage::error(message)]) {
                    set_cookie(&mut response, &cookie);
                }
                response
            }
            WebError::NotFound(msg) => error_page(StatusCode::NOT_FOUND, &msg),
            WebError::BadRequest(msg) => error_page(StatusCode::BAD_REQUEST, &msg),
            WebError::Internal(msg) => {
                // Details stay in the log
                tracing::error!("Internal error: {}", msg);
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Внутренняя ошибка сервера",
                )
            }
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let title = status.canonical_reason().unwrap_or("Error");
    (status, Html(views::error_page(title, message))).into_response()
}

impl From<sqlx::Error> for WebError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => WebError::NotFound("Resource not found".to_string()),
            _ => WebError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<PasswordError> for WebError {
    fn from(err: PasswordError) -> Self {
        WebError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<SessionError> for WebError {
    fn from(err: SessionError) -> Self {
        WebError::Internal(format!("Session token operation failed: {}", err))
    }
}
