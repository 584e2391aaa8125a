// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (remote platform issues)
    UpstreamAuth { status: u16, body: Value },
    UpstreamRequest { status: u16, body: Value },
    UpstreamBadResponse(String),
    UpstreamUnreachable(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::UpstreamAuth { .. } => 502,
            ApiError::UpstreamRequest { .. } => 502,
            ApiError::UpstreamBadResponse(_) => 502,
            ApiError::UpstreamUnreachable(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::UpstreamAuth { .. } => "Authentication against the platform failed",
            ApiError::UpstreamRequest { .. } => "The platform rejected the forwarded request",
            ApiError::UpstreamBadResponse(msg) => msg,
            ApiError::UpstreamUnreachable(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::UpstreamAuth { .. } => "UPSTREAM_AUTH_ERROR",
            ApiError::UpstreamRequest { .. } => "UPSTREAM_REQUEST_ERROR",
            ApiError::UpstreamBadResponse(_) => "UPSTREAM_BAD_RESPONSE",
            ApiError::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::UpstreamAuth { status, body }
            | ApiError::UpstreamRequest { status, body } => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code(),
                    "upstream_status": status,
                    "upstream_body": body,
                })
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code(),
                })
            }
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert seam error types to ApiError
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        match err {
            crate::database::manager::DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::service_unavailable("Service is not configured for database access")
            }
            crate::database::manager::DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("DATABASE_URL is not a valid URL");
                ApiError::service_unavailable("Service is not configured for database access")
            }
            crate::database::manager::DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but never expose SQL details to clients
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::RoleServiceError> for ApiError {
    fn from(err: crate::services::RoleServiceError) -> Self {
        match err {
            crate::services::RoleServiceError::UserNotFound(_)
            | crate::services::RoleServiceError::RoleNotFound(_)
            | crate::services::RoleServiceError::BackupNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            crate::services::RoleServiceError::Database(sqlx_err) => {
                tracing::error!("Role service database error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            crate::services::RoleServiceError::DatabaseManager(db_err) => db_err.into(),
        }
    }
}

impl From<crate::remote::UpstreamError> for ApiError {
    fn from(err: crate::remote::UpstreamError) -> Self {
        match err {
            crate::remote::UpstreamError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::service_unavailable("Service is not configured for the remote platform")
            }
            crate::remote::UpstreamError::Auth { status, body } => ApiError::UpstreamAuth {
                status,
                body: parse_upstream_body(body),
            },
            crate::remote::UpstreamError::Request { status, body } => ApiError::UpstreamRequest {
                status,
                body: parse_upstream_body(body),
            },
            crate::remote::UpstreamError::Decode(req_err) => {
                tracing::error!("Upstream response decode error: {}", req_err);
                ApiError::UpstreamBadResponse(
                    "Remote platform returned an undecodable response".to_string(),
                )
            }
            crate::remote::UpstreamError::Transport(req_err) => {
                tracing::error!("Upstream transport error: {}", req_err);
                ApiError::UpstreamUnreachable("Remote platform unreachable".to_string())
            }
        }
    }
}

/// Upstream bodies are usually JSON; fall back to the raw text when not
fn parse_upstream_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
