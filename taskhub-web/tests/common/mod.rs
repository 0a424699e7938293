//! Common test utilities for integration tests
//!
//! Every `TestContext` owns a private in-memory SQLite database with
//! migrations applied and two registered users. Requests go straight through
//! the router, with sessions minted the same way the login handler does.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use sqlx::SqlitePool;
use taskhub_shared::auth::password::hash_password;
use taskhub_shared::auth::session::{create_token, SessionClaims};
use taskhub_shared::db::migrations::run_migrations;
use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
use taskhub_shared::flash::{self, FlashMessage};
use taskhub_shared::models::label::Label;
use taskhub_shared::models::status::Status;
use taskhub_shared::models::task::{CreateTask, Task};
use taskhub_shared::models::user::{CreateUser, User};
use taskhub_web::app::{build_router, AppState};
use taskhub_web::config::{self, Config, ServerConfig, SessionConfig};
use tower::Service as _;

pub const PASSWORD: &str = "testpass123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
    pub user1: User,
    pub user2: User,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let config = test_config();

        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let user1 = create_user(&db, "testuser1", "Ivan", "Petrov").await?;
        let user2 = create_user(&db, "testuser2", "Anna", "Smirnova").await?;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(TestContext {
            db,
            app,
            config,
            user1,
            user2,
        })
    }

    /// `Cookie` header value for a signed-in session
    pub fn session_for(&self, user: &User) -> String {
        let claims = SessionClaims::new(user.id, chrono::Duration::hours(1)).unwrap();
        let token = create_token(&claims, &self.config.session.secret).unwrap();
        format!("taskhub_session={token}")
    }

    pub async fn get(&self, uri: &str, user: Option<&User>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, self.session_for(user));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Sends an urlencoded form; repeated keys are kept in order
    pub async fn post(&self, uri: &str, user: Option<&User>, fields: &[(&str, &str)]) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, self.session_for(user));
        }
        self.send(builder.body(Body::from(encode_form(fields))).unwrap())
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    pub async fn status(&self, name: &str) -> Status {
        Status::create(&self.db, name).await.unwrap()
    }

    pub async fn label(&self, name: &str) -> Label {
        Label::create(&self.db, name).await.unwrap()
    }

    pub async fn task(
        &self,
        name: &str,
        status: &Status,
        author: &User,
        executor: Option<&User>,
        labels: &[&Label],
    ) -> Task {
        Task::create(
            &self.db,
            CreateTask {
                name: name.to_string(),
                description: String::new(),
                status_id: status.id,
                author_id: author.id,
                executor_id: executor.map(|u| u.id),
                label_ids: labels.iter().map(|l| l.id).collect(),
            },
        )
        .await
        .unwrap()
    }
}

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
        },
        database: config::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret: "integration-test-secret-0123456789abcdef".to_string(),
            ttl_hours: 1,
        },
    }
}

async fn create_user(
    db: &SqlitePool,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: None,
            password_hash: hash_password(PASSWORD)?,
        },
    )
    .await?;
    Ok(user)
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Asserts a 302 and returns its target
pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::FOUND);
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

/// `Set-Cookie` values sent with the response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Flash messages queued by the response
pub fn flash_messages(response: &Response<Body>) -> Vec<FlashMessage> {
    set_cookies(response)
        .iter()
        .filter_map(|cookie| cookie.strip_prefix("taskhub_flash="))
        .filter_map(|rest| rest.split(';').next())
        .flat_map(|value| flash::decode(value).unwrap())
        .collect()
}

pub fn flash_texts(response: &Response<Body>) -> Vec<String> {
    flash_messages(response).into_iter().map(|m| m.text).collect()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
