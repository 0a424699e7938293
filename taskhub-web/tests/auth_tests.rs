/// Integration tests for login, logout and session handling
///
/// Run with: cargo test -p taskhub-web --test auth_tests

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_text, flash_texts, location, set_cookies, TestContext, PASSWORD};
use serde_json::Value;
use taskhub_shared::flash::{self, FlashMessage};
use taskhub_web::error::LOGIN_PROMPT;
use taskhub_web::routes::auth::LOGIN_FAILED;

#[tokio::test]
async fn test_index_is_public() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/login/"));

    let response = ctx.get("/", Some(&ctx.user1)).await;
    let body = body_text(response).await;
    assert!(body.contains("Ivan Petrov"));
}

#[tokio::test]
async fn test_login_success_sets_session() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post(
            "/login/",
            None,
            &[("username", "testuser1"), ("password", PASSWORD)],
        )
        .await;

    assert_eq!(location(&response), "/");
    assert_eq!(flash_texts(&response), vec!["Вы залогинены"]);

    let cookies = set_cookies(&response);
    let session = cookies
        .iter()
        .find(|c| c.starts_with("taskhub_session="))
        .expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(!session.contains("Secure"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post(
            "/login/",
            None,
            &[("username", "testuser1"), ("password", "wrong")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)
        .iter()
        .all(|c| !c.starts_with("taskhub_session=")));

    let body = body_text(response).await;
    assert!(body.contains(LOGIN_FAILED));
    assert!(body.contains("testuser1"));
}

#[tokio::test]
async fn test_login_unknown_user() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post("/login/", None, &[("username", "nobody"), ("password", PASSWORD)])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(LOGIN_FAILED));
}

#[tokio::test]
async fn test_login_page_when_signed_in() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/login/", Some(&ctx.user1)).await;
    assert_eq!(location(&response), "/");
    assert_eq!(flash_texts(&response), vec!["Вы уже авторизованы"]);
}

#[tokio::test]
async fn test_logout() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.post("/logout/", Some(&ctx.user1), &[]).await;
    assert_eq!(location(&response), "/");
    assert_eq!(flash_texts(&response), vec!["Вы вышли из системы"]);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("taskhub_session=;") && c.contains("Max-Age=0")));

    // Anonymous logout is a plain redirect
    let response = ctx.post("/logout/", None, &[]).await;
    assert_eq!(location(&response), "/");
    assert!(flash_texts(&response).is_empty());
}

#[tokio::test]
async fn test_forged_session_is_anonymous() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .uri("/tasks/")
        .header(header::COOKIE, "taskhub_session=not.a.token")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(location(&response), "/login/");
    assert_eq!(flash_texts(&response), vec![LOGIN_PROMPT]);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("taskhub_session=;")));
}

#[tokio::test]
async fn test_flash_shown_once() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/tasks/", None).await;
    let cookie = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("taskhub_flash="))
        .unwrap();
    let pair = cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/login/")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("taskhub_flash=;") && c.contains("Max-Age=0")));
    assert!(body_text(response).await.contains(LOGIN_PROMPT));
}

#[tokio::test]
async fn test_refused_request_keeps_pending_flash() {
    let ctx = TestContext::new().await.unwrap();

    let pending = flash::encode(&[FlashMessage::success("Задача успешно создана")]).unwrap();
    let request = Request::builder()
        .uri("/tasks/")
        .header(header::COOKIE, format!("taskhub_flash={pending}"))
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(location(&response), "/login/");
    assert_eq!(
        flash_texts(&response),
        vec!["Задача успешно создана", LOGIN_PROMPT]
    );
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_security_headers() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/", None).await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/nowhere/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
