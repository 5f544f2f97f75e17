use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

/// Submissions of one credential form allowed per client in one window.
const MAX_ATTEMPTS: u32 = 5;
const WINDOW: Duration = Duration::from_secs(60);

/// The forms that accept a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialForm {
    Login,
    Register,
}

impl CredentialForm {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            _ => None,
        }
    }
}

struct AttemptWindow {
    started: Instant,
    attempts: u32,
}

/// Fixed-window counter of credential submissions per client IP and form.
/// Lives in process memory, so limits are per instance.
#[derive(Clone, Default)]
pub struct CredentialLimiter {
    windows: Arc<Mutex<HashMap<(IpAddr, CredentialForm), AttemptWindow>>>,
}

impl CredentialLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one attempt made at `now`. Ok(attempts left) or Err(time until
    /// the client may try again).
    pub async fn record_attempt(
        &self,
        ip: IpAddr,
        form: CredentialForm,
        now: Instant,
    ) -> Result<u32, Duration> {
        let mut windows = self.windows.lock().await;
        let window = windows.entry((ip, form)).or_insert(AttemptWindow {
            started: now,
            attempts: 0,
        });

        if now.saturating_duration_since(window.started) >= WINDOW {
            window.started = now;
            window.attempts = 0;
        }

        if window.attempts >= MAX_ATTEMPTS {
            return Err(WINDOW.saturating_sub(now.saturating_duration_since(window.started)));
        }

        window.attempts += 1;
        Ok(MAX_ATTEMPTS - window.attempts)
    }

    /// Forgets windows that closed before `now`.
    async fn purge_closed(&self, now: Instant) {
        self.windows
            .lock()
            .await
            .retain(|_, window| now.saturating_duration_since(window.started) < WINDOW);
    }

    /// Purges closed windows once per window for the life of the process.
    pub fn spawn_purge(&self) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(WINDOW);
            loop {
                ticker.tick().await;
                limiter.purge_closed(Instant::now()).await;
            }
        });
    }
}

/// Limits POSTs to the login and registration forms. Rendering the forms is
/// never limited.
pub async fn rate_limit_credentials(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let form = match CredentialForm::from_path(req.uri().path()) {
        Some(form) if req.method() == Method::POST => form,
        _ => return Ok(next.run(req).await),
    };

    let ip = addr.ip();
    match state
        .credential_limiter
        .record_attempt(ip, form, Instant::now())
        .await
    {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, form = ?form, remaining, "Credential attempt allowed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                form = ?form,
                retry_after_secs = retry_after.as_secs(),
                "Too many credential attempts"
            );
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> IpAddr {
        IpAddr::from([10, 0, 0, 1])
    }

    #[tokio::test]
    async fn test_blocks_after_max_attempts() {
        let limiter = CredentialLimiter::new();
        let now = Instant::now();

        for i in 0..MAX_ATTEMPTS {
            let result = limiter.record_attempt(client(), CredentialForm::Login, now).await;
            assert_eq!(result, Ok(MAX_ATTEMPTS - i - 1));
        }

        let result = limiter.record_attempt(client(), CredentialForm::Login, now).await;
        assert_eq!(result, Err(WINDOW));
    }

    #[tokio::test]
    async fn test_window_reopens_after_it_closes() {
        let limiter = CredentialLimiter::new();
        let now = Instant::now();
        for _ in 0..=MAX_ATTEMPTS {
            let _ = limiter.record_attempt(client(), CredentialForm::Login, now).await;
        }

        let later = now + WINDOW;
        let result = limiter.record_attempt(client(), CredentialForm::Login, later).await;
        assert_eq!(result, Ok(MAX_ATTEMPTS - 1));
    }

    #[tokio::test]
    async fn test_forms_and_clients_are_counted_separately() {
        let limiter = CredentialLimiter::new();
        let now = Instant::now();
        for _ in 0..MAX_ATTEMPTS {
            let _ = limiter.record_attempt(client(), CredentialForm::Login, now).await;
        }

        assert!(limiter
            .record_attempt(client(), CredentialForm::Register, now)
            .await
            .is_ok());
        assert!(limiter
            .record_attempt(IpAddr::from([10, 0, 0, 2]), CredentialForm::Login, now)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_purge_drops_only_closed_windows() {
        let limiter = CredentialLimiter::new();
        let now = Instant::now();
        let _ = limiter.record_attempt(client(), CredentialForm::Login, now).await;
        let _ = limiter
            .record_attempt(client(), CredentialForm::Register, now + WINDOW)
            .await;

        limiter.purge_closed(now + WINDOW).await;

        let windows = limiter.windows.lock().await;
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key(&(client(), CredentialForm::Register)));
    }

    #[test]
    fn test_only_credential_paths_are_limited() {
        assert_eq!(CredentialForm::from_path("/login"), Some(CredentialForm::Login));
        assert_eq!(CredentialForm::from_path("/register"), Some(CredentialForm::Register));
        assert_eq!(CredentialForm::from_path("/logout"), None);
    }
}
