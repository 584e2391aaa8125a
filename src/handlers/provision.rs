use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::remote::{CreateDatabaseRequest, CreateUserRequest, PlatformClient};

/// POST /create/user - Forward a user-creation payload to the platform
///
/// Authenticates with the cached bearer token plus a CSRF token and relays
/// the payload unchanged; the upstream JSON body is echoed back on success.
pub async fn create_user(
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let client = PlatformClient::shared()?;
    let response = client.create_user(&payload).await?;

    Ok(Json(json!({
        "status": "success",
        "response": response
    })))
}

/// POST /create/database - Forward a database-connection definition
pub async fn create_database(
    Json(payload): Json<CreateDatabaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let client = PlatformClient::shared()?;
    let response = client.create_database(&payload).await?;

    Ok(Json(json!({
        "status": "success",
        "response": response
    })))
}
