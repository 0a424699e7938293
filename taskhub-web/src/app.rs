/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskhub_web::{app::AppState, config::Config};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let app = taskhub_web::app::build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    guard::login_required,
    middleware::{context::load_context, security::SecurityHeadersLayer},
};
use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use taskhub_shared::auth::session::SessionError;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    /// Session lifetime; fails if the configured hours overflow a duration
    pub fn session_ttl(&self) -> Result<chrono::Duration, SessionError> {
        chrono::Duration::try_hours(self.config.session.ttl_hours)
            .ok_or_else(|| SessionError::CreateError("Session lifetime out of range".to_string()))
    }

    /// Whether cookies must carry the `Secure` flag
    pub fn secure_cookies(&self) -> bool {
        self.config.server.production
    }
}

/// Builds the complete router with all routes and middleware
///
/// ```text
/// /                                  index (public)
/// /health                            JSON health check (public)
/// /login/  /logout/                  session (public)
/// /users/                            list, create/ (public)
/// /users/:id/update/ /:id/delete/    own account only
/// /statuses/ ...                     signed-in users
/// /labels/ ...                       signed-in users
/// /tasks/ ...                        signed-in users; delete by author only
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. Request tracing (tower-http TraceLayer)
/// 3. Request context (session user and flash messages)
/// 4. Login requirement (statuses, labels, tasks only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::index::index))
        .route("/health", get(routes::health::health_check))
        .route("/login/", get(routes::auth::login_page).post(routes::auth::login))
        .route("/logout/", get(routes::auth::logout).post(routes::auth::logout));

    let user_routes = Router::new()
        .route("/users/", get(routes::users::list_users))
        .route(
            "/users/create/",
            get(routes::users::create_page).post(routes::users::create_user),
        )
        .route(
            "/users/:id/update/",
            get(routes::users::update_page).post(routes::users::update_user),
        )
        .route(
            "/users/:id/delete/",
            get(routes::users::delete_page).post(routes::users::delete_user),
        );

    let status_routes = Router::new()
        .route("/statuses/", get(routes::statuses::list_statuses))
        .route(
            "/statuses/create/",
            get(routes::statuses::create_page).post(routes::statuses::create_status),
        )
        .route(
            "/statuses/:id/update/",
            get(routes::statuses::update_page).post(routes::statuses::update_status),
        )
        .route(
            "/statuses/:id/delete/",
            get(routes::statuses::delete_page).post(routes::statuses::delete_status),
        )
        .route_layer(from_fn(login_required));

    let label_routes = Router::new()
        .route("/labels/", get(routes::labels::list_labels))
        .route(
            "/labels/create/",
            get(routes::labels::create_page).post(routes::labels::create_label),
        )
        .route(
            "/labels/:id/update/",
            get(routes::labels::update_page).post(routes::labels::update_label),
        )
        .route(
            "/labels/:id/delete/",
            get(routes::labels::delete_page).post(routes::labels::delete_label),
        )
        .route_layer(from_fn(login_required));

    let task_routes = Router::new()
        .route("/tasks/", get(routes::tasks::list_tasks))
        .route(
            "/tasks/create/",
            get(routes::tasks::create_page).post(routes::tasks::create_task),
        )
        .route("/tasks/:id/", get(routes::tasks::task_detail))
        .route(
            "/tasks/:id/update/",
            get(routes::tasks::update_page).post(routes::tasks::update_task),
        )
        .route(
            "/tasks/:id/delete/",
            get(routes::tasks::delete_page).post(routes::tasks::delete_task),
        )
        .route_layer(from_fn(login_required));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(status_routes)
        .merge(label_routes)
        .merge(task_routes)
        .layer(from_fn_with_state(state.clone(), load_context))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.server.production))
        .with_state(state)
}
