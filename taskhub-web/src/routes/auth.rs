/// Login and logout
///
/// # Endpoints
///
/// - `GET /login/` - Login form; signed-in users are sent home
/// - `POST /login/` - Check credentials and start a session
/// - `GET|POST /logout/` - End the session, if any

use crate::{
    app::AppState,
    error::WebResult,
    forms::{FormErrors, LoginForm, NON_FIELD},
    session::{clear_cookie, session_cookie, set_cookie, redirect, RequestContext, SESSION_COOKIE},
    views,
};
use axum::{extract::State, response::Response, Form};
use taskhub_shared::{
    auth::{password, session},
    flash::FlashMessage,
    models::user::User,
};
use tracing::{info, warn};
use validator::Validate;

pub const LOGIN_FAILED: &str = "Пожалуйста, введите правильные имя пользователя и пароль. \
     Оба поля могут быть чувствительны к регистру.";

const TITLE: &str = "Вход";

pub async fn login_page(ctx: RequestContext) -> Response {
    if ctx.is_authenticated() {
        return ctx.redirect_with("/", FlashMessage::info("Вы уже авторизованы"));
    }

    let body = views::auth::login(&LoginForm::default(), &FormErrors::new());
    ctx.render(TITLE, &body)
}

pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    if let Err(e) = form.validate() {
        let body = views::auth::login(&form, &FormErrors::from(e));
        return Ok(ctx.render(TITLE, &body));
    }

    let Some(user) = authenticate(&state, &form).await? else {
        warn!(username = %form.username, "Failed login attempt");

        let mut errors = FormErrors::new();
        errors.add(NON_FIELD, LOGIN_FAILED);
        let body = views::auth::login(&form, &errors);
        return Ok(ctx.render(TITLE, &body));
    };

    let ttl = state.session_ttl()?;
    let claims = session::SessionClaims::new(user.id, ttl)?;
    let token = session::create_token(&claims, state.session_secret())?;

    info!(user_id = user.id, "User logged in");

    let mut response = ctx.redirect_with("/", FlashMessage::success("Вы залогинены"));
    set_cookie(
        &mut response,
        &session_cookie(
            &token,
            ttl.num_seconds(),
            state.secure_cookies(),
        ),
    );
    Ok(response)
}

/// Returns the user if the credentials match
async fn authenticate(state: &AppState, form: &LoginForm) -> WebResult<Option<User>> {
    let Some(user) = User::find_by_username(&state.db, &form.username).await? else {
        return Ok(None);
    };

    if password::verify_password(&form.password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

pub async fn logout(ctx: RequestContext) -> Response {
    let Some(user) = ctx.user.as_ref() else {
        return redirect("/");
    };

    info!(user_id = user.id, "User logged out");

    let mut response = ctx.redirect_with("/", FlashMessage::info("Вы вышли из системы"));
    set_cookie(&mut response, &clear_cookie(SESSION_COOKIE));
    response
}
