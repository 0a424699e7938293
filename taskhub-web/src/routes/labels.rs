/// Task label management
///
/// All endpoints require a signed-in user. A label attached to any task
/// cannot be deleted; detach it from its tasks first.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    forms::{field_errors, FormErrors, NameForm},
    session::RequestContext,
    views::{
        self,
        catalog::{Entry, LABELS},
    },
};
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use taskhub_shared::{
    flash::FlashMessage,
    models::{is_unique_violation, label::Label, DeleteOutcome},
};
use tracing::{info, warn};

const NAME_TAKEN: &str = "Метка с таким именем уже существует.";

pub async fn list_labels(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<Response> {
    let labels = Label::list(&state.db).await?;
    let entries: Vec<Entry<'_>> = labels
        .iter()
        .map(|l| Entry {
            id: l.id,
            name: &l.name,
            created_at: &l.created_at,
        })
        .collect();

    Ok(ctx.render(LABELS.list_title, &LABELS.list(&entries)))
}

pub async fn create_page(ctx: RequestContext) -> Response {
    render_create(&ctx, &NameForm::default(), &FormErrors::new())
}

pub async fn create_label(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<NameForm>,
) -> WebResult<Response> {
    let mut errors = field_errors(&form);
    if !errors.is_empty() {
        return Ok(render_create(&ctx, &form, &errors));
    }

    match Label::create(&state.db, form.name.trim()).await {
        Ok(label) => {
            info!(label_id = label.id, "Label created");
            Ok(ctx.redirect_with(
                LABELS.base_url,
                FlashMessage::success("Метка успешно создана"),
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
    let label = find_label(&state, id).await?;
    let form = NameForm { name: label.name };
    Ok(render_update(&ctx, id, &form, &FormErrors::new()))
}

pub async fn update_label(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Form(form): Form<NameForm>,
) -> WebResult<Response> {
    let mut errors = field_errors(&form);
    if !errors.is_empty() {
        return Ok(render_update(&ctx, id, &form, &errors));
    }

    match Label::update(&state.db, id, form.name.trim()).await {
        Ok(Some(_)) => {
            info!(label_id = id, "Label updated");
            Ok(ctx.redirect_with(
                LABELS.base_url,
                FlashMessage::success("Метка успешно изменена"),
            ))
        }
        Ok(None) => Err(WebError::NotFound("Label not found".to_string())),
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
    let label = find_label(&state, id).await?;
    let body = views::confirm_delete(&LABELS.delete_url(id), &label.name);
    Ok(ctx.render(LABELS.delete_title, &body))
}

pub async fn delete_label(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    match Label::delete(&state.db, id).await? {
        DeleteOutcome::Deleted => {
            info!(label_id = id, "Label deleted");
            Ok(ctx.redirect_with(
                LABELS.base_url,
                FlashMessage::success("Метка успешно удалена"),
            ))
        }
        DeleteOutcome::InUse => {
            warn!(label_id = id, "Refusing to delete label in use");
            Ok(ctx.redirect_with(
                LABELS.base_url,
                FlashMessage::error("Невозможно удалить метку, потому что она используется"),
            ))
        }
        DeleteOutcome::NotFound => Err(WebError::NotFound("Label not found".to_string())),
    }
}

async fn find_label(state: &AppState, id: i64) -> WebResult<Label> {
    Label::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| WebError::NotFound("Label not found".to_string()))
}

fn render_create(ctx: &RequestContext, form: &NameForm, errors: &FormErrors) -> Response {
    let body = LABELS.name_form(&LABELS.create_url(), form, errors, "Создать");
    ctx.render(LABELS.create_title, &body)
}

fn render_update(ctx: &RequestContext, id: i64, form: &NameForm, errors: &FormErrors) -> Response {
    let body = LABELS.name_form(&LABELS.update_url(id), form, errors, "Изменить");
    ctx.render(LABELS.update_title, &body)
}
