/// Task status management
///
/// All endpoints require a signed-in user. A status that any task still
/// uses cannot be deleted.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    forms::{field_errors, FormErrors, NameForm},
    session::RequestContext,
    views::{
        self,
        catalog::{Entry, STATUSES},
    },
};
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use taskhub_shared::{
    flash::FlashMessage,
    models::{is_unique_violation, status::Status, DeleteOutcome},
};
use tracing::{info, warn};

const NAME_TAKEN: &str = "Статус с таким именем уже существует.";

pub async fn list_statuses(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<Response> {
    let statuses = Status::list(&state.db).await?;
    let entries: Vec<Entry<'_>> = statuses
        .iter()
        .map(|s| Entry {
            id: s.id,
            name: &s.name,
            created_at: &s.created_at,
        })
        .collect();

    Ok(ctx.render(STATUSES.list_title, &STATUSES.list(&entries)))
}

pub async fn create_page(ctx: RequestContext) -> Response {
    render_create(&ctx, &NameForm::default(), &FormErrors::new())
}

pub async fn create_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<NameForm>,
) -> WebResult<Response> {
    let mut errors = field_errors(&form);
    if !errors.is_empty() {
        return Ok(render_create(&ctx, &form, &errors));
    }

    match Status::create(&state.db, form.name.trim()).await {
        Ok(status) => {
            info!(status_id = status.id, "Status created");
            Ok(ctx.redirect_with(
                STATUSES.base_url,
                FlashMessage::success("Статус успешно создан"),
            ))
        }
        Err(e) if is_unique_violation(&e) => {
            errors.add("name", NAME_TAKEN);
            Ok(render_create(&ctx, &form, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let status = find_status(&state, id).await?;
    let form = NameForm { name: status.name };
    Ok(render_update(&ctx, id, &form, &FormErrors::new()))
}

pub async fn update_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Form(form): Form<NameForm>,
) -> WebResult<Response> {
    let mut errors = field_errors(&form);
    if !errors.is_empty() {
        return Ok(render_update(&ctx, id, &form, &errors));
    }

    match Status::update(&state.db, id, form.name.trim()).await {
        Ok(Some(_)) => {
            info!(status_id = id, "Status updated");
            Ok(ctx.redirect_with(
                STATUSES.base_url,
                FlashMessage::success("Статус успешно изменен"),
            ))
        }
        Ok(None) => Err(WebError::NotFound("Status not found".to_string())),
        Err(e) if is_unique_violation(&e) => {
            errors.add("name", NAME_TAKEN);
            Ok(render_update(&ctx, id, &form, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let status = find_status(&state, id).await?;
    let body = views::confirm_delete(&STATUSES.delete_url(id), &status.name);
    Ok(ctx.render(STATUSES.delete_title, &body))
}

pub async fn delete_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    match Status::delete(&state.db, id).await? {
        DeleteOutcome::Deleted => {
            info!(status_id = id, "Status deleted");
            Ok(ctx.redirect_with(
                STATUSES.base_url,
                FlashMessage::success("Статус успешно удален"),
            ))
        }
        DeleteOutcome::InUse => {
            warn!(status_id = id, "Refusing to delete status in use");
            Ok(ctx.redirect_with(
                STATUSES.base_url,
                FlashMessage::error("Невозможно удалить статус, потому что он используется"),
            ))
        }
        DeleteOutcome::NotFound => Err(WebError::NotFound("Status not found".to_string())),
    }
}

async fn find_status(state: &AppState, id: i64) -> WebResult<Status> {
    Status::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| WebError::NotFound("Status not found".to_string()))
}

fn render_create(ctx: &RequestContext, form: &NameForm, errors: &FormErrors) -> Response {
    let body = STATUSES.name_form(&STATUSES.create_url(), form, errors, "Создать");
    ctx.render(STATUSES.create_title, &body)
}

fn render_update(ctx: &RequestContext, id: i64, form: &NameForm, errors: &FormErrors) -> Response {
    let body = STATUSES.name_form(&STATUSES.update_url(id), form, errors, "Изменить");
    ctx.render(STATUSES.update_title, &body)
}
