use axum::{extract::State, response::Response, Extension};
use tower_sessions::Session;

use crate::auth::middleware::CurrentUser;
use crate::dto::MoodsData;
use crate::error::AppResult;
use crate::views::render;
use crate::AppState;

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> AppResult<Response> {
    let moods = state.store.list_moods(user.id).await?;
    render(&session, "moods", Some(&user), MoodsData { moods }).await
}
