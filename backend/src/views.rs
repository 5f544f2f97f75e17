use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::flash::{self, Flash};
use crate::models::user::{User, UserSummary};

/// Everything a template needs to draw one page.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub page: &'static str,
    pub user: Option<UserSummary>,
    pub flashes: Vec<Flash>,
    pub data: T,
}

pub async fn render<T: Serialize>(
    session: &Session,
    page: &'static str,
    user: Option<&User>,
    data: T,
) -> AppResult<Response> {
    render_with_status(session, StatusCode::OK, page, user, data).await
}

/// Renders `page`, consuming any pending flash messages.
pub async fn render_with_status<T: Serialize>(
    session: &Session,
    status: StatusCode,
    page: &'static str,
    user: Option<&User>,
    data: T,
) -> AppResult<Response> {
    let body = Page {
        page,
        user: user.map(UserSummary::from),
        flashes: flash::take(session).await?,
        data,
    };
    Ok((status, Json(body)).into_response())
}
