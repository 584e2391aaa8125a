use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Absolute URL the 303 response points clients at after a reassignment.
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Per-request timeout for calls to the BI platform.
    pub request_timeout_secs: u64,
    /// How long a fetched bearer token is served from cache.
    pub token_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Environment presets first, specific env vars override
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("BRIDGE_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("REDIRECT_URL") {
            self.server.redirect_url = v;
        }
        if let Ok(v) = env::var("REMOTE_REQUEST_TIMEOUT_SECS") {
            self.remote.request_timeout_secs = v.parse().unwrap_or(self.remote.request_timeout_secs);
        }
        if let Ok(v) = env::var("REMOTE_TOKEN_TTL_SECS") {
            self.remote.token_ttl_secs = v.parse().unwrap_or(self.remote.token_ttl_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            server: ServerConfig {
                port: 8000,
                redirect_url: "http://localhost:8000/redirect.html".to_string(),
            },
            remote: RemoteConfig {
                request_timeout_secs: 30,
                token_ttl_secs: 300,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 5,
            },
            server: ServerConfig {
                port: 8000,
                redirect_url: "/redirect.html".to_string(),
            },
            remote: RemoteConfig {
                request_timeout_secs: 15,
                token_ttl_secs: 300,
            },
        }
    }
}

// Global singleton config - initialized once at startup.
// Secrets (DATABASE_URL, BASE_URL, ADMIN_USERNAME, ADMIN_PASSWORD) are read
// from env at the point of use and never carry code defaults.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
