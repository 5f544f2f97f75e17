use axum::{extract::State, response::Response, Extension};
use tower_sessions::Session;

use crate::auth::middleware::CurrentUser;
use crate::dto::JournalsData;
use crate::error::AppResult;
use crate::views::render;
use crate::AppState;

pub async fn list_journals(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> AppResult<Response> {
    let journals = state.store.list_journals(user.id).await?;
    render(&session, "journal", Some(&user), JournalsData { journals }).await
}
