/// Request context middleware
///
/// Runs before every handler. Resolves the session cookie to a user and
/// decodes pending flash messages, then stores the result as a
/// [`RequestContext`] request extension.
///
/// A missing, expired or forged session token, or one naming a user that no
/// longer exists, makes the request anonymous rather than failing it. The
/// stale cookie is removed on the way out.

use crate::app::AppState;
use crate::error::WebResult;
use crate::session::{
    clear_cookie, read_cookie, set_cookie, RequestContext, FLASH_COOKIE, SESSION_COOKIE,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskhub_shared::{auth::session, flash, models::user::User};
use tracing::debug;

pub async fn load_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> WebResult<Response> {
    let mut stale_session = false;

    let user = match read_cookie(req.headers(), SESSION_COOKIE) {
        Some(token) => {
            let user = resolve_user(&state, &token).await?;
            stale_session = user.is_none();
            user
        }
        None => None,
    };

    let flashes = match read_cookie(req.headers(), FLASH_COOKIE) {
        Some(value) => flash::decode(&value).unwrap_or_else(|e| {
            debug!(error = %e, "Ignoring unreadable flash cookie");
            Vec::new()
        }),
        None => Vec::new(),
    };

    let ctx = RequestContext { user, flashes };
    req.extensions_mut().insert(ctx.clone());

    let mut response = next.run(req).await;
    ctx.merge_error_flash(&mut response);
    if stale_session {
        set_cookie(&mut response, &clear_cookie(SESSION_COOKIE));
    }

    Ok(response)
}

async fn resolve_user(state: &AppState, token: &str) -> WebResult<Option<User>> {
    let claims = match session::validate_token(token, state.session_secret()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Discarding session token");
            return Ok(None);
        }
    };

    let user = User::find_by_id(&state.db, claims.sub).await?;
    if user.is_none() {
        debug!(user_id = claims.sub, "Session names a user that no longer exists");
    }

    Ok(user)
}
