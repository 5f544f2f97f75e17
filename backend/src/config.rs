use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-process store is used (local runs only).
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,

    pub session_secure_cookie: bool,
    pub session_idle_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),

            session_secure_cookie: env::var("SESSION_SECURE_COOKIE")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),
            session_idle_minutes: env::var("SESSION_IDLE_MINUTES")
                .unwrap_or_else(|_| "1440".into()) // one day
                .parse()
                .unwrap_or(1440),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 20,
            host: "127.0.0.1".into(),
            port: 8080,
            session_secure_cookie: false,
            session_idle_minutes: 1440,
        }
    }
}
