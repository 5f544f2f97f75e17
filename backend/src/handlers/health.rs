use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bulletjournal-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "database": "ok" },
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "checks": { "database": "failed" },
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_health_and_readiness() {
        let mut app = TestApp::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let res = app.get("/health").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["service"], "bulletjournal-api");

        let res = app.get("/readyz").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["checks"]["database"], "ok");
    }
}
