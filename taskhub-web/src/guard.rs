/// Turns permission checks into responses
///
/// Predicates in `taskhub_shared::auth::authorization` decide; this module
/// maps their [`Access`] result to the same redirect behavior everywhere:
///
/// - `Allowed`: the handler continues
/// - `Unauthenticated`: redirect to the login page with a prompt
/// - `Forbidden`: redirect to the denial target with its message

use crate::error::{WebError, WebResult};
use crate::session::RequestContext;
use axum::{extract::Request, middleware::Next, response::Response};
use taskhub_shared::auth::authorization::{require_login, Access};

/// Where to send a signed-in user who isn't allowed, and what to tell them
#[derive(Debug, Clone)]
pub struct Denial {
    pub redirect_to: String,
    pub message: String,
}

impl Denial {
    pub fn new(redirect_to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
            message: message.into(),
        }
    }
}

pub fn enforce(access: Access, denial: Denial) -> WebResult<()> {
    match access {
        Access::Allowed => Ok(()),
        Access::Unauthenticated => Err(WebError::Unauthenticated),
        Access::Forbidden => {
            tracing::warn!(redirect_to = %denial.redirect_to, "Permission denied");
            Err(WebError::Forbidden {
                redirect_to: denial.redirect_to,
                message: denial.message,
            })
        }
    }
}

/// Middleware for route groups that only signed-in users may see
///
/// Must sit inside the layer that installs [`RequestContext`].
pub async fn login_required(req: Request, next: Next) -> WebResult<Response> {
    let actor = req
        .extensions()
        .get::<RequestContext>()
        .and_then(RequestContext::user_id);

    enforce(require_login(actor), Denial::new("/", ""))?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforce_allowed() {
        assert!(enforce(Access::Allowed, Denial::new("/users/", "no")).is_ok());
    }

    #[test]
    fn test_enforce_unauthenticated() {
        let err = enforce(Access::Unauthenticated, Denial::new("/users/", "no")).unwrap_err();
        assert!(matches!(err, WebError::Unauthenticated));
    }

    #[test]
    fn test_enforce_forbidden_uses_denial() {
        let err = enforce(Access::Forbidden, Denial::new("/tasks/", "no")).unwrap_err();

        match err {
            WebError::Forbidden {
                redirect_to,
                message,
            } => {
                assert_eq!(redirect_to, "/tasks/");
                assert_eq!(message, "no");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
