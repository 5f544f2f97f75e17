//! One-shot messages carried in the session until the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppResult;

const FLASH_KEY: &str = "_flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

pub async fn push(
    session: &Session,
    category: FlashCategory,
    message: impl Into<String>,
) -> AppResult<()> {
    let mut pending: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    pending.push(Flash {
        category,
        message: message.into(),
    });
    session.insert(FLASH_KEY, pending).await?;
    Ok(())
}

pub async fn success(session: &Session, message: impl Into<String>) -> AppResult<()> {
    push(session, FlashCategory::Success, message).await
}

pub async fn failure(session: &Session, message: impl Into<String>) -> AppResult<()> {
    push(session, FlashCategory::Failure, message).await
}

/// Drains the queue; each message is handed out once.
pub async fn take(session: &Session) -> AppResult<Vec<Flash>> {
    let pending: Option<Vec<Flash>> = session.remove(FLASH_KEY).await?;
    Ok(pending.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_are_taken_once_in_order() {
        let session = session();
        success(&session, "saved").await.unwrap();
        failure(&session, "but also this").await.unwrap();

        let flashes = take(&session).await.unwrap();
        assert_eq!(
            flashes,
            vec![
                Flash {
                    category: FlashCategory::Success,
                    message: "saved".into(),
                },
                Flash {
                    category: FlashCategory::Failure,
                    message: "but also this".into(),
                },
            ]
        );
        assert!(take(&session).await.unwrap().is_empty());
    }
}
