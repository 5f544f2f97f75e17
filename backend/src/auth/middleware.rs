use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth::session::current_user;
use crate::error::AppError;
use crate::models::user::User;
use crate::AppState;

/// The logged-in user, inserted into request extensions by [`require_login`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match current_user(&state, &session).await? {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(req).await)
        }
        None => Ok(Redirect::to("/login").into_response()),
    }
}
