/// Per-request session state and cookie handling
///
/// The `load_context` middleware resolves the session cookie and the pending
/// flash messages once per request and stores a [`RequestContext`] in the
/// request extensions. Handlers take it as an extractor:
///
/// ```no_run
/// use axum::response::Response;
/// use taskhub_web::session::RequestContext;
/// use taskhub_shared::flash::FlashMessage;
///
/// async fn handler(ctx: RequestContext) -> Response {
///     ctx.redirect_with("/", FlashMessage::info("Привет"))
/// }
/// ```
///
/// # Cookies
///
/// - `taskhub_session`: signed session token, `HttpOnly; SameSite=Lax`
/// - `taskhub_flash`: messages waiting for the next rendered page

use crate::error::WebError;
use crate::views;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;
use taskhub_shared::{
    flash::{self, FlashMessage},
    models::user::User,
};

pub const SESSION_COOKIE: &str = "taskhub_session";
pub const FLASH_COOKIE: &str = "taskhub_flash";

pub const LOGIN_URL: &str = "/login/";

/// Request-scoped view of who is asking and what they haven't seen yet
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Signed-in user, None for anonymous requests
    pub user: Option<User>,

    /// Flash messages queued by earlier requests
    pub flashes: Vec<FlashMessage>,
}

impl RequestContext {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Redirects and queues `message` after any messages still pending
    pub fn redirect_with(&self, location: &str, message: FlashMessage) -> Response {
        let mut messages = self.flashes.clone();
        messages.push(message);

        let mut response = redirect(location);
        if let Some(cookie) = flash_cookie(&messages) {
            set_cookie(&mut response, &cookie);
        }
        response
    }

    /// Puts pending messages in front of the one an error response queued
    pub fn merge_error_flash(&self, response: &mut Response) {
        let Some(ErrorFlash(message)) = response.extensions_mut().remove::<ErrorFlash>() else {
            return;
        };
        if self.flashes.is_empty() {
            return;
        }

        let mut messages = self.flashes.clone();
        messages.push(message);
        if let Some(cookie) = flash_cookie(&messages) {
            // An error redirect carries no cookie but its own flash
            response.headers_mut().remove(header::SET_COOKIE);
            set_cookie(response, &cookie);
        }
    }

    /// Renders a full page; pending flash messages are shown and consumed
    pub fn render(&self, title: &str, body: &str) -> Response {
        let page = views::layout(title, self.user.as_ref(), &self.flashes, body);
        let mut response = (StatusCode::OK, Html(page)).into_response();

        if !self.flashes.is_empty() {
            set_cookie(&mut response, &clear_cookie(FLASH_COOKIE));
        }
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Flash message queued by an error response
///
/// Error responses are built without the request, so they can't see pending
/// messages; [`RequestContext::merge_error_flash`] restores them.
#[derive(Debug, Clone)]
pub struct ErrorFlash(pub FlashMessage);

/// Extractor for handlers that need a signed-in user
///
/// Anonymous requests are rejected with a redirect to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.user.clone())
            .map(CurrentUser)
            .ok_or(WebError::Unauthenticated)
    }
}

/// Plain 302 redirect
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Appends a `Set-Cookie` header; values that aren't valid header text are dropped
pub fn set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Dropping malformed Set-Cookie value"),
    }
}

/// Reads one cookie from the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={max_age_seconds}; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value carrying flash messages, None if they can't be encoded
pub fn flash_cookie(messages: &[FlashMessage]) -> Option<String> {
    match flash::encode(messages) {
        Ok(value) => Some(format!("{FLASH_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax")),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode flash messages");
            None
        }
    }
}

/// `Set-Cookie` value that removes a cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
