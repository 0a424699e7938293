/// User registration and account management
///
/// # Endpoints
///
/// - `GET /users/` - List all users (public)
/// - `GET|POST /users/create/` - Register (public)
/// - `GET|POST /users/:id/update/` - Edit own account
/// - `GET|POST /users/:id/delete/` - Delete own account
///
/// Attempts to edit or delete another account are sent back to the user
/// list with an error message. An account that authored or is assigned to a
/// task cannot be deleted.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    forms::{field_errors, FormErrors, UserForm, REQUIRED},
    guard::{enforce, Denial},
    session::{clear_cookie, set_cookie, RequestContext, SESSION_COOKIE},
    views,
};
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use taskhub_shared::{
    auth::{authorization::self_service, password},
    flash::FlashMessage,
    models::{
        is_unique_violation,
        user::{CreateUser, UpdateUser, User},
        DeleteOutcome,
    },
};
use tracing::{info, warn};

const LIST_URL: &str = "/users/";
const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
const UPDATE_DENIED: &str = "У вас нет прав для изменения другого пользователя";
const DELETE_DENIED: &str = "У вас нет прав для удаления другого пользователя";

pub async fn list_users(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
    let users = User::list(&state.db).await?;
    Ok(ctx.render("Пользователи", &views::users::list(&users)))
}

pub async fn create_page(ctx: RequestContext) -> Response {
    render_registration(&ctx, &UserForm::default(), &FormErrors::new())
}

pub async fn create_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<UserForm>,
) -> WebResult<Response> {
    let mut errors = field_errors(&form);
    check_password(&form, true, &mut errors);
    if errors.field("username").is_empty() && username_taken(&state, &form.username, None).await? {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_registration(&ctx, &form, &errors));
    }

    let created = User::create(
        &state.db,
        CreateUser {
            username: form.username.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email(),
            password_hash: password::hash_password(&form.password1)?,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            errors.add("username", USERNAME_TAKEN);
            return Ok(render_registration(&ctx, &form, &errors));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, username = %user.username, "User registered");
    Ok(ctx.redirect_with("/login/", FlashMessage::success("Пользователь успешно создан")))
}

pub async fn update_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    enforce(self_service(ctx.user_id(), id), Denial::new(LIST_URL, UPDATE_DENIED))?;
    let user = find_user(&state, id).await?;

    let form = UserForm {
        first_name: user.first_name,
        last_name: user.last_name,
        username: user.username,
        ..Default::default()
    };
    Ok(render_profile(&ctx, id, &form, &FormErrors::new()))
}

pub async fn update_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Form(form): Form<UserForm>,
) -> WebResult<Response> {
    enforce(self_service(ctx.user_id(), id), Denial::new(LIST_URL, UPDATE_DENIED))?;
    find_user(&state, id).await?;

    // The profile form has no email field
    let mut errors = field_errors(&UserForm {
        email: String::new(),
        ..form.clone()
    });
    check_password(&form, false, &mut errors);
    if errors.field("username").is_empty()
        && username_taken(&state, &form.username, Some(id)).await?
    {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_profile(&ctx, id, &form, &errors));
    }

    let password_hash = if form.wants_password_change() {
        Some(password::hash_password(&form.password1)?)
    } else {
        None
    };

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            username: Some(form.username.trim().to_string()),
            first_name: Some(form.first_name.trim().to_string()),
            last_name: Some(form.last_name.trim().to_string()),
            email: None,
            password_hash,
        },
    )
    .await;

    match updated {
        Ok(Some(_)) => {}
        Ok(None) => return Err(WebError::NotFound("User not found".to_string())),
        Err(e) if is_unique_violation(&e) => {
            errors.add("username", USERNAME_TAKEN);
            return Ok(render_profile(&ctx, id, &form, &errors));
        }
        Err(e) => return Err(e.into()),
    }

    info!(user_id = id, "User updated");
    Ok(ctx.redirect_with(LIST_URL, FlashMessage::success("Пользователь успешно изменен")))
}

pub async fn delete_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    enforce(self_service(ctx.user_id(), id), Denial::new(LIST_URL, DELETE_DENIED))?;
    let user = find_user(&state, id).await?;

    let body = views::confirm_delete(&format!("/users/{id}/delete/"), &user.full_name());
    Ok(ctx.render("Удаление пользователя", &body))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    enforce(self_service(ctx.user_id(), id), Denial::new(LIST_URL, DELETE_DENIED))?;

    match User::delete(&state.db, id).await? {
        DeleteOutcome::Deleted => {
            info!(user_id = id, "User deleted");

            // The account was the session's own; sign it out
            let mut response =
                ctx.redirect_with(LIST_URL, FlashMessage::success("Пользователь успешно удален"));
            set_cookie(&mut response, &clear_cookie(SESSION_COOKIE));
            Ok(response)
        }
        DeleteOutcome::InUse => {
            warn!(user_id = id, "Refusing to delete user referenced by tasks");
            Ok(ctx.redirect_with(
                LIST_URL,
                FlashMessage::error("Невозможно удалить пользователя, потому что он используется"),
            ))
        }
        DeleteOutcome::NotFound => Err(WebError::NotFound("User not found".to_string())),
    }
}

async fn find_user(state: &AppState, id: i64) -> WebResult<User> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| WebError::NotFound("User not found".to_string()))
}

/// True if another user already has this username
async fn username_taken(state: &AppState, username: &str, except: Option<i64>) -> WebResult<bool> {
    let existing = User::find_by_username(&state.db, username.trim()).await?;
    Ok(existing.is_some_and(|user| Some(user.id) != except))
}

/// Registration requires a password; on update a blank pair keeps the old one
fn check_password(form: &UserForm, required: bool, errors: &mut FormErrors) {
    if !required && !form.wants_password_change() {
        return;
    }
    if form.password1.is_empty() {
        errors.add("password1", REQUIRED);
        return;
    }
    if let Err(message) = password::validate_password_pair(&form.password1, &form.password2) {
        errors.add("password2", message);
    }
}

fn render_registration(ctx: &RequestContext, form: &UserForm, errors: &FormErrors) -> Response {
    let body = views::users::user_form("/users/create/", form, errors, true, "Зарегистрировать");
    ctx.render("Регистрация", &body)
}

fn render_profile(ctx: &RequestContext, id: i64, form: &UserForm, errors: &FormErrors) -> Response {
    let body = views::users::user_form(&format!("/users/{id}/update/"), form, errors, false, "Изменить");
    ctx.render("Изменение пользователя", &body)
}
