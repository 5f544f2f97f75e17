use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::user::User;
use crate::AppState;

/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Starts a fresh session for `user_id`, dropping anything the old one held.
pub async fn log_in(session: &Session, user_id: Uuid) -> AppResult<()> {
    session.clear().await;
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    Ok(())
}

pub async fn log_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

/// The user behind this session, if any. A session naming a user that no
/// longer exists is treated as logged out.
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<Uuid>(SESSION_USER_ID_KEY).await? else {
        return Ok(None);
    };

    let user = state.store.find_user_by_id(user_id).await?;
    if user.is_none() {
        tracing::debug!(user_id = %user_id, "Session refers to unknown user");
        session.remove::<Uuid>(SESSION_USER_ID_KEY).await?;
    }
    Ok(user)
}
