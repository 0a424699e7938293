/// Integration tests for task management and filtering
///
/// Run with: cargo test -p taskhub-web --test tasks_tests

mod common;

use axum::http::StatusCode;
use common::{body_text, flash_texts, location, TestContext};
use taskhub_shared::models::label::Label;
use taskhub_shared::models::task::{Task, TaskView};
use taskhub_web::error::LOGIN_PROMPT;

#[tokio::test]
async fn test_tasks_require_login() {
    let ctx = TestContext::new().await.unwrap();
    let status = ctx.status("новый").await;
    let task = ctx.task("Secret", &status, &ctx.user1, None, &[]).await;

    for uri in [
        "/tasks/".to_string(),
        "/tasks/create/".to_string(),
        format!("/tasks/{}/", task.id),
        format!("/tasks/{}/update/", task.id),
    ] {
        let response = ctx.get(&uri, None).await;
        assert_eq!(location(&response), "/login/", "GET {uri}");
        assert_eq!(flash_texts(&response), vec![LOGIN_PROMPT]);
    }

    let status_id = status.id.to_string();
    let response = ctx
        .post(
            "/tasks/create/",
            None,
            &[("name", "Sneaky"), ("status", status_id.as_str())],
        )
        .await;
    assert_eq!(location(&response), "/login/");

    let response = ctx
        .post(&format!("/tasks/{}/delete/", task.id), None, &[])
        .await;
    assert_eq!(location(&response), "/login/");

    assert_eq!(Task::count(&ctx.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_task() {
    let ctx = TestContext::new().await.unwrap();
    let status = ctx.status("новый").await;
    let bug = ctx.label("bug").await;
    let urgent = ctx.label("срочно").await;

    let response = ctx.get("/tasks/create/", Some(&ctx.user1)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let status_id = status.id.to_string();
    let executor_id = ctx.user2.id.to_string();
    let bug_id = bug.id.to_string();
    let urgent_id = urgent.id.to_string();
    let response = ctx
        .post(
            "/tasks/create/",
            Some(&ctx.user1),
            &[
                ("name", "Починить вход"),
                ("description", "Кнопка не работает"),
                ("status", status_id.as_str()),
                ("executor", executor_id.as_str()),
                ("labels", bug_id.as_str()),
                ("labels", urgent_id.as_str()),
            ],
        )
        .await;

    assert_eq!(location(&response), "/tasks/");
    assert_eq!(flash_texts(&response), vec!["Задача успешно создана"]);

    let tasks = TaskView::list(&ctx.db, &Default::default()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.name, "Починить вход");
    assert_eq!(task.description, "Кнопка не работает");
    assert_eq!(task.author_id, ctx.user1.id);
    assert_eq!(task.executor_id, Some(ctx.user2.id));

    let mut label_ids = Task::label_ids(&ctx.db, task.id).await.unwrap();
    label_ids.sort();
    assert_eq!(label_ids, vec![bug.id, urgent.id]);
}

#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new().await.unwrap();
    ctx.status("новый").await;

    // Missing name and status
    let response = ctx
        .post("/tasks/create/", Some(&ctx.user1), &[("name", ""), ("status", "")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Обязательное поле."));

    // Status that doesn't exist
    let response = ctx
        .post(
            "/tasks/create/",
            Some(&ctx.user1),
            &[("name", "Ghost"), ("status", "999")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(Task::count(&ctx.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_task_detail() {
    let ctx = TestContext::new().await.unwrap();
    let status = ctx.status("в работе").await;
    let label = ctx.label("backend").await;
    let task = ctx
        .task("Write docs", &status, &ctx.user1, Some(&ctx.user2), &[&label])
        .await;

    let response = ctx.get(&format!("/tasks/{}/", task.id), Some(&ctx.user2)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Write docs"));
    assert!(body.contains("Ivan Petrov"));
    assert!(body.contains("Anna Smirnova"));
    assert!(body.contains("в работе"));
    assert!(body.contains("backend"));

    let response = ctx.get("/tasks/999/", Some(&ctx.user1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_task_keeps_author() {
    let ctx = TestContext::new().await.unwrap();
    let status = ctx.status("новый").await;
    let done = ctx.status("завершен").await;
    let label = ctx.label("bug").await;
    let task = ctx.task("Draft", &status, &ctx.user1, None, &[&label]).await;
    let uri = format!("/tasks/{}/update/", task.id);

    let response = ctx.get(&uri, Some(&ctx.user2)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Draft"));

    // Any signed-in user may edit; omitting labels clears them
    let done_id = done.id.to_string();
    let response = ctx
        .post(
            &uri,
            Some(&ctx.user2),
            &[("name", "Final"), ("status", done_id.as_str()), ("executor", "")],
        )
        .await;
    assert_eq!(location(&response), "/tasks/");
    assert_eq!(flash_texts(&response), vec!["Задача успешно изменена"]);

    let updated = Task::find_by_id(&ctx.db, task.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Final");
    assert_eq!(updated.status_id, done.id);
    assert_eq!(updated.author_id, ctx.user1.id);
    assert!(updated.executor_id.is_none());
    assert!(Task::label_ids(&ctx.db, task.id).await.unwrap().is_empty());
    assert!(Label::find_by_id(&ctx.db, label.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_task_by_author() {
    let ctx = TestContext::new().await.unwrap();
    let status = ctx.status("новый").await;
    let task = ctx.task("Obsolete", &status, &ctx.user1, None, &[]).await;
    let uri = format!("/tasks/{}/delete/", task.id);

    let response = ctx.get(&uri, Some(&ctx.user1)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.post(&uri, Some(&ctx.user1), &[]).await;
    assert_eq!(location(&response), "/tasks/");
    assert_eq!(flash_texts(&response), vec!["Задача успешно удалена"]);
    assert!(Task::find_by_id(&ctx.db, task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_task_by_other_user_denied() {
    let ctx = TestContext::new().await.unwrap();
    let status = ctx.status("новый").await;
    let task = ctx
        .task("Mine", &status, &ctx.user1, Some(&ctx.user2), &[])
        .await;
    let uri = format!("/tasks/{}/delete/", task.id);

    for response in [
        ctx.get(&uri, Some(&ctx.user2)).await,
        ctx.post(&uri, Some(&ctx.user2), &[]).await,
    ] {
        assert_eq!(location(&response), "/tasks/");
        assert_eq!(
            flash_texts(&response),
            vec!["Задачу может удалить только ее автор"]
        );
    }

    assert!(Task::find_by_id(&ctx.db, task.id).await.unwrap().is_some());
}

struct FilterFixture {
    ctx: TestContext,
    new_id: String,
    bug_id: String,
}

/// Four tasks covering each status/executor/label/author combination that matters
async fn filter_fixture() -> FilterFixture {
    let ctx = TestContext::new().await.unwrap();
    let new = ctx.status("новый").await;
    let done = ctx.status("завершен").await;
    let bug = ctx.label("bug").await;
    let docs = ctx.label("docs").await;

    ctx.task("Task Alpha", &new, &ctx.user1, Some(&ctx.user2), &[&bug]).await;
    ctx.task("Task Bravo", &new, &ctx.user2, Some(&ctx.user2), &[&bug, &docs])
        .await;
    ctx.task("Task Charlie", &done, &ctx.user1, Some(&ctx.user2), &[&bug])
        .await;
    ctx.task("Task Delta", &new, &ctx.user1, None, &[&docs]).await;

    FilterFixture {
        new_id: new.id.to_string(),
        bug_id: bug.id.to_string(),
        ctx,
    }
}

async fn listed(ctx: &TestContext, query: &str) -> Vec<&'static str> {
    let response = ctx.get(&format!("/tasks/{query}"), Some(&ctx.user1)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    ["Task Alpha", "Task Bravo", "Task Charlie", "Task Delta"]
        .into_iter()
        .filter(|name| body.contains(name))
        .collect()
}

#[tokio::test]
async fn test_list_without_filters() {
    let f = filter_fixture().await;

    assert_eq!(
        listed(&f.ctx, "").await,
        vec!["Task Alpha", "Task Bravo", "Task Charlie", "Task Delta"]
    );

    // Blank values mean "any"
    assert_eq!(
        listed(&f.ctx, "?status=&executor=&label=").await.len(),
        4
    );
}

#[tokio::test]
async fn test_filters_are_conjunctive() {
    let f = filter_fixture().await;
    let executor = f.ctx.user2.id;

    // Unassigned tasks never match an executor
    assert_eq!(
        listed(&f.ctx, &format!("?executor={executor}")).await,
        vec!["Task Alpha", "Task Bravo", "Task Charlie"]
    );
    assert!(listed(&f.ctx, &format!("?executor={}", f.ctx.user1.id))
        .await
        .is_empty());

    assert_eq!(
        listed(&f.ctx, &format!("?status={}", f.new_id)).await,
        vec!["Task Alpha", "Task Bravo", "Task Delta"]
    );
    assert_eq!(
        listed(&f.ctx, &format!("?status={}&label={}", f.new_id, f.bug_id)).await,
        vec!["Task Alpha", "Task Bravo"]
    );
    assert_eq!(
        listed(
            &f.ctx,
            &format!(
                "?status={}&executor={executor}&label={}&self_tasks=on",
                f.new_id, f.bug_id
            )
        )
        .await,
        vec!["Task Alpha"]
    );
}

#[tokio::test]
async fn test_self_tasks_filter() {
    let f = filter_fixture().await;

    assert_eq!(
        listed(&f.ctx, "?self_tasks=on").await,
        vec!["Task Alpha", "Task Charlie", "Task Delta"]
    );

    let response = f
        .ctx
        .get("/tasks/?self_tasks=on", Some(&f.ctx.user2))
        .await;
    let body = body_text(response).await;
    assert!(body.contains("Task Bravo"));
    assert!(!body.contains("Task Alpha"));
}
