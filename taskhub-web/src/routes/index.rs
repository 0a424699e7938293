use crate::{session::RequestContext, views};
use axum::response::Response;

pub async fn index(ctx: RequestContext) -> Response {
    let body = views::auth::index(ctx.user.as_ref());
    ctx.render("Менеджер задач", &body)
}
