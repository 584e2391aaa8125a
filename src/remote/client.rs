use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::{CreateDatabaseRequest, CreateUserRequest};

/// Errors from calls to the remote BI platform
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Upstream authentication failed with status {status}")]
    Auth { status: u16, body: String },

    #[error("Upstream rejected request with status {status}")]
    Request { status: u16, body: String },

    #[error("Upstream response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Upstream unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    provider: &'a str,
    refresh: bool,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CsrfResponse {
    result: String,
}

struct CachedToken {
    value: String,
    fetched_at: Instant,
}

/// Client for the remote BI platform's REST API.
///
/// Owns the admin credentials and a TTL-bounded bearer-token cache so the
/// platform is not re-authenticated on every forwarded request. Each call
/// is a single attempt with the configured timeout; there are no retries.
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    admin_username: String,
    admin_password: String,
    token_ttl: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl PlatformClient {
    pub fn new(
        base_url: impl Into<String>,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
        token_ttl: Duration,
        request_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
            token_ttl,
            token: Mutex::new(None),
        })
    }

    /// Build a client from BASE_URL / ADMIN_USERNAME / ADMIN_PASSWORD env
    /// vars and the config singleton's timeouts
    pub fn from_env() -> Result<Self, UpstreamError> {
        let base_url =
            std::env::var("BASE_URL").map_err(|_| UpstreamError::ConfigMissing("BASE_URL"))?;
        let admin_username = std::env::var("ADMIN_USERNAME")
            .map_err(|_| UpstreamError::ConfigMissing("ADMIN_USERNAME"))?;
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .map_err(|_| UpstreamError::ConfigMissing("ADMIN_PASSWORD"))?;

        let settings = &crate::config::config().remote;
        Self::new(
            base_url,
            admin_username,
            admin_password,
            Duration::from_secs(settings.token_ttl_secs),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Process-wide client so the token cache survives across requests
    pub fn shared() -> Result<&'static PlatformClient, UpstreamError> {
        static SHARED: OnceLock<PlatformClient> = OnceLock::new();
        if let Some(client) = SHARED.get() {
            return Ok(client);
        }
        let client = Self::from_env()?;
        Ok(SHARED.get_or_init(|| client))
    }

    /// Bearer token for the platform API, served from cache while fresh.
    ///
    /// On a cache miss this POSTs the admin credentials to the login
    /// endpoint; any non-200 surfaces as `UpstreamError::Auth` with the
    /// upstream status and body.
    pub async fn bearer_token(&self) -> Result<String, UpstreamError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.fetched_at.elapsed() < self.token_ttl {
                debug!("Serving bearer token from cache");
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/v1/security/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: &self.admin_username,
                password: &self.admin_password,
                provider: "db",
                refresh: true,
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Auth {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let login: LoginResponse = response.json().await.map_err(UpstreamError::Decode)?;
        info!("Fetched fresh bearer token from platform");

        *cached = Some(CachedToken {
            value: login.access_token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(login.access_token)
    }

    /// CSRF token for state-changing platform calls. A failure anywhere in
    /// the chain, including the nested bearer fetch, is an auth error.
    pub async fn csrf_token(&self) -> Result<String, UpstreamError> {
        let bearer = self.bearer_token().await?;

        let url = format!("{}/api/v1/security/csrf_token/", self.base_url);
        let response = self.http.get(&url).bearer_auth(&bearer).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Auth {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let csrf: CsrfResponse = response.json().await.map_err(UpstreamError::Decode)?;
        Ok(csrf.result)
    }

    /// Forward a user-creation payload; 200/201/202 count as success
    pub async fn create_user(&self, payload: &CreateUserRequest) -> Result<Value, UpstreamError> {
        let bearer = self.bearer_token().await?;
        let csrf = self.csrf_token().await?;

        let url = format!("{}/api/v1/security/users/", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&bearer)
            .header("X-CSRFToken", csrf)
            .json(payload)
            .send()
            .await?;

        Self::accept_response(response).await
    }

    /// Forward a database-connection-definition payload
    pub async fn create_database(
        &self,
        payload: &CreateDatabaseRequest,
    ) -> Result<Value, UpstreamError> {
        let bearer = self.bearer_token().await?;

        let url = format!("{}/api/v1/database/", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&bearer)
            .json(payload)
            .send()
            .await?;

        Self::accept_response(response).await
    }

    async fn accept_response(response: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => {
                response.json().await.map_err(UpstreamError::Decode)
            }
            _ => Err(UpstreamError::Request {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
