/// Task management
///
/// # Endpoints
///
/// - `GET /tasks/` - Filtered task list
/// - `GET|POST /tasks/create/` - New task; the requester becomes its author
/// - `GET /tasks/:id/` - Task details with labels
/// - `GET|POST /tasks/:id/update/` - Edit; the author can't be changed
/// - `GET|POST /tasks/:id/delete/` - Delete; author only
///
/// # Filtering
///
/// `GET /tasks/?status=1&executor=2&label=3&self_tasks=on`
///
/// Every given criterion must hold. Blank values are ignored, and
/// `self_tasks` restricts the list to tasks the requester created.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    forms::{FormErrors, TaskFilterQuery, TaskForm, TaskInput, INVALID_CHOICE},
    guard::{enforce, Denial},
    session::{CurrentUser, RequestContext},
    views::{self, tasks::TaskChoices, Choice},
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use taskhub_shared::{
    auth::authorization::task_author,
    flash::FlashMessage,
    models::{
        label::Label,
        status::Status,
        task::{CreateTask, Task, TaskView, UpdateTask},
        user::User,
    },
};
use tracing::info;

const LIST_URL: &str = "/tasks/";
const DELETE_DENIED: &str = "Задачу может удалить только ее автор";

pub async fn list_tasks(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TaskFilterQuery>,
) -> WebResult<Response> {
    let filter = query.to_filter(user.id);
    let tasks = TaskView::list(&state.db, &filter).await?;
    let choices = load_choices(&state).await?;

    Ok(ctx.render("Задачи", &views::tasks::list(&tasks, &choices, &query)))
}

pub async fn task_detail(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let task = TaskView::find(&state.db, id)
        .await?
        .ok_or_else(|| WebError::NotFound("Task not found".to_string()))?;
    let labels = Label::list_for_task(&state.db, id).await?;

    Ok(ctx.render(&task.name, &views::tasks::detail(&task, &labels)))
}

pub async fn create_page(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<Response> {
    render_create(&state, &ctx, &TaskForm::default(), &FormErrors::new()).await
}

pub async fn create_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentUser(user): CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let form = TaskForm::from_pairs(pairs);
    let input = match check_task(&state, &form).await? {
        Ok(input) => input,
        Err(errors) => return render_create(&state, &ctx, &form, &errors).await,
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            name: input.name,
            description: input.description,
            status_id: input.status_id,
            author_id: user.id,
            executor_id: input.executor_id,
            label_ids: input.label_ids,
        },
    )
    .await?;

    info!(task_id = task.id, author_id = user.id, "Task created");
    Ok(ctx.redirect_with(LIST_URL, FlashMessage::success("Задача успешно создана")))
}

pub async fn update_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let task = find_task(&state, id).await?;
    let label_ids = Task::label_ids(&state.db, id).await?;

    let form = TaskForm {
        name: task.name,
        description: task.description,
        status: task.status_id.to_string(),
        executor: task.executor_id.map(|e| e.to_string()).unwrap_or_default(),
        labels: label_ids.iter().map(i64::to_string).collect(),
    };
    render_update(&state, &ctx, id, &form, &FormErrors::new()).await
}

pub async fn update_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    find_task(&state, id).await?;

    let form = TaskForm::from_pairs(pairs);
    let input = match check_task(&state, &form).await? {
        Ok(input) => input,
        Err(errors) => return render_update(&state, &ctx, id, &form, &errors).await,
    };

    Task::update(
        &state.db,
        id,
        UpdateTask {
            name: input.name,
            description: input.description,
            status_id: input.status_id,
            executor_id: input.executor_id,
            label_ids: input.label_ids,
        },
    )
    .await?
    .ok_or_else(|| WebError::NotFound("Task not found".to_string()))?;

    info!(task_id = id, "Task updated");
    Ok(ctx.redirect_with(LIST_URL, FlashMessage::success("Задача успешно изменена")))
}

pub async fn delete_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let task = find_task(&state, id).await?;
    enforce(task_author(ctx.user_id(), &task), Denial::new(LIST_URL, DELETE_DENIED))?;

    let body = views::confirm_delete(&format!("/tasks/{id}/delete/"), &task.name);
    Ok(ctx.render("Удаление задачи", &body))
}

pub async fn delete_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let task = find_task(&state, id).await?;
    enforce(task_author(ctx.user_id(), &task), Denial::new(LIST_URL, DELETE_DENIED))?;

    if !Task::delete(&state.db, id).await? {
        return Err(WebError::NotFound("Task not found".to_string()));
    }

    info!(task_id = id, "Task deleted");
    Ok(ctx.redirect_with(LIST_URL, FlashMessage::success("Задача успешно удалена")))
}

async fn find_task(state: &AppState, id: i64) -> WebResult<Task> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| WebError::NotFound("Task not found".to_string()))
}

/// Parses the form and checks that every referenced row exists
async fn check_task(state: &AppState, form: &TaskForm) -> WebResult<Result<TaskInput, FormErrors>> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => return Ok(Err(errors)),
    };

    let mut errors = FormErrors::new();
    if Status::find_by_id(&state.db, input.status_id).await?.is_none() {
        errors.add("status", INVALID_CHOICE);
    }
    if let Some(executor_id) = input.executor_id {
        if User::find_by_id(&state.db, executor_id).await?.is_none() {
            errors.add("executor", INVALID_CHOICE);
        }
    }
    for label_id in &input.label_ids {
        if Label::find_by_id(&state.db, *label_id).await?.is_none() {
            errors.add("labels", INVALID_CHOICE);
            break;
        }
    }

    if errors.is_empty() {
        Ok(Ok(input))
    } else {
        Ok(Err(errors))
    }
}

async fn load_choices(state: &AppState) -> WebResult<TaskChoices> {
    let statuses = Status::list(&state.db).await?;
    let users = User::list(&state.db).await?;
    let labels = Label::list(&state.db).await?;

    Ok(TaskChoices {
        statuses: statuses.into_iter().map(|s| Choice::new(s.id, s.name)).collect(),
        users: users
            .iter()
            .map(|u| Choice::new(u.id, u.full_name()))
            .collect(),
        labels: labels.into_iter().map(|l| Choice::new(l.id, l.name)).collect(),
    })
}

async fn render_create(
    state: &AppState,
    ctx: &RequestContext,
    form: &TaskForm,
    errors: &FormErrors,
) -> WebResult<Response> {
    let choices = load_choices(state).await?;
    let body = views::tasks::task_form("/tasks/create/", form, &choices, errors, "Создать");
    Ok(ctx.render("Создать задачу", &body))
}

async fn render_update(
    state: &AppState,
    ctx: &RequestContext,
    id: i64,
    form: &TaskForm,
    errors: &FormErrors,
) -> WebResult<Response> {
    let choices = load_choices(state).await?;
    let body = views::tasks::task_form(&format!("/tasks/{id}/update/"), form, &choices, errors, "Изменить");
    Ok(ctx.render("Изменение задачи", &body))
}
