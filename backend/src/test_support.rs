//! Drives the full router in-process, carrying the session cookie between
//! requests the way a browser would.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::rate_limit::CredentialLimiter;
use crate::clock::FixedClock;
use crate::config::Config;
use crate::db::MemoryStore;
use crate::{build_router, AppState};

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// Messages of the flashes shown on this page.
    pub fn flash_messages(&self) -> Vec<String> {
        self.body["flashes"]
            .as_array()
            .map(|flashes| {
                flashes
                    .iter()
                    .filter_map(|f| f["message"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct TestApp {
    router: Router,
    pub clock: Arc<FixedClock>,
    store: Arc<MemoryStore>,
    sessions: tower_sessions::MemoryStore,
    cookie: Option<String>,
}

impl TestApp {
    /// A fresh app whose "today" is `today`.
    pub fn new(today: NaiveDate) -> Self {
        let clock = Arc::new(FixedClock::new(today));
        let store = Arc::new(MemoryStore::new());
        let sessions = tower_sessions::MemoryStore::default();
        let router = Self::router(clock.clone(), store.clone(), sessions.clone());
        Self {
            router,
            clock,
            store,
            sessions,
            cookie: None,
        }
    }

    fn router(
        clock: Arc<FixedClock>,
        store: Arc<MemoryStore>,
        sessions: tower_sessions::MemoryStore,
    ) -> Router {
        let state = AppState {
            store,
            clock,
            config: Arc::new(Config::default()),
            credential_limiter: CredentialLimiter::new(),
        };
        build_router(state, sessions).layer(MockConnectInfo(SocketAddr::from((
            [127, 0, 0, 1],
            4000,
        ))))
    }

    /// Rebuilds the app over the same journal and session stores, as a
    /// server restart against a persistent database would.
    pub fn restart(&mut self) {
        self.router = Self::router(self.clock.clone(), self.store.clone(), self.sessions.clone());
    }

    /// Forgets the session cookie, as a second browser would.
    pub fn drop_cookie(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_form(&mut self, path: &str, body: &str) -> TestResponse {
        self.send(Method::POST, path, Some(body.to_string())).await
    }

    async fn send(&mut self, method: Method, path: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let set_cookie = set_cookie.to_str().unwrap();
            let pair = set_cookie.split(';').next().unwrap_or_default().trim();
            let removed = pair.ends_with('=') || set_cookie.contains("Max-Age=0");
            self.cookie = if removed { None } else { Some(pair.to_string()) };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            location,
            body,
        }
    }

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> TestResponse {
        let body = format!(
            "username={}&email={}&password={}&confirm_password={}",
            username, email, password, password
        );
        self.post_form("/register", &body).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form(
            "/login",
            &format!("username={}&password={}", username, password),
        )
        .await
    }

    /// Registers, logs in and lands on `/home`, so no flash is left pending.
    /// Panics if any step fails.
    pub async fn signed_in(today: NaiveDate, username: &str) -> Self {
        let mut app = Self::new(today);
        let email = format!("{}%40example.com", username);
        let res = app.register(username, &email, "s3cret-pass").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "register failed: {}", res.body);
        let res = app.login(username, "s3cret-pass").await;
        assert_eq!(res.location.as_deref(), Some("/home"), "login failed: {}", res.body);
        let res = app.get("/home").await;
        assert_eq!(res.status, StatusCode::OK, "home failed: {}", res.body);
        app
    }
}
