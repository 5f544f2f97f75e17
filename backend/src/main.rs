use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

mod auth;
mod clock;
mod config;
mod db;
mod dto;
mod error;
mod flash;
mod handlers;
mod models;
mod views;

#[cfg(test)]
mod test_support;

use auth::rate_limit::CredentialLimiter;
use clock::{Clock, SystemClock};
use config::Config;
use db::{JournalStore, MemoryStore, PgStore};

/// How often expired session records are deleted from Postgres.
const SESSION_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JournalStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
    pub credential_limiter: CredentialLimiter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulletjournal_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let credential_limiter = CredentialLimiter::new();
    credential_limiter.spawn_purge();

    let state = |store: Arc<dyn JournalStore>| AppState {
        store,
        clock: Arc::new(SystemClock),
        config: config.clone(),
        credential_limiter: credential_limiter.clone(),
    };

    // Journal data and sessions share one backend: Postgres when configured.
    let app = match &config.database_url {
        Some(url) => {
            let db = db::connect_postgres(url, config.db_max_connections).await?;

            let sessions = PostgresStore::new(db.clone());
            sessions.migrate().await?;
            let sweeper = sessions.clone();
            tokio::spawn(async move {
                if let Err(e) = sweeper
                    .continuously_delete_expired(SESSION_SWEEP_INTERVAL)
                    .await
                {
                    tracing::error!(error = %e, "Expired session deletion stopped");
                }
            });

            build_router(state(Arc::new(PgStore::new(db))), sessions)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores; data and sessions are lost on restart");
            build_router(
                state(Arc::new(MemoryStore::new())),
                tower_sessions::MemoryStore::default(),
            )
        }
    };

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Client IPs feed the credential rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;
    Ok(())
}

pub fn build_router<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let sessions = SessionManagerLayer::new(session_store)
        .with_secure(state.config.session_secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session_idle_minutes,
        )));

    let credential_routes = Router::new()
        .route(
            "/register",
            get(handlers::auth::register_form).post(handlers::auth::register),
        )
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_credentials,
        ));

    let public_routes = Router::new()
        .route("/", get(handlers::home::landing))
        .route("/logout", get(handlers::auth::logout))
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(credential_routes);

    let protected_routes = Router::new()
        .route("/home", get(handlers::home::home))
        .route("/home/journal", post(handlers::home::journal_submit))
        .route("/home/mood", post(handlers::home::mood_submit))
        .route("/calendar", get(handlers::calendar::calendar))
        // Habits
        .route("/habits", get(handlers::habits::list_habits))
        .route(
            "/habits/add",
            get(handlers::habits::add_habit_form).post(handlers::habits::add_habit),
        )
        .route("/habits/:id/delete", post(handlers::habits::delete_habit))
        // History
        .route("/moods", get(handlers::moods::list_moods))
        .route("/journal", get(handlers::journal::list_journals))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_login,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(sessions)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
