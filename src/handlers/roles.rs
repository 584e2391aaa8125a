use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::RoleService;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRoleQuery {
    pub email: String,
    /// Target role id. The parameter keeps its historical name so existing
    /// operator links keep working.
    pub tenant_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct RestoreUserRoleQuery {
    pub email: String,
}

/// GET /update_user_role?email&tenant_id - Reassign a user's role
///
/// Backs up the user's current assignments, clears the non-default ones and
/// binds the user to the requested role, then answers 303 with a Location
/// header pointing at the static confirmation page.
pub async fn update_user_role(
    Query(query): Query<UpdateUserRoleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = RoleService::new().await?;
    service.reassign_role(&query.email, query.tenant_id).await?;

    let redirect_url = crate::config::config().server.redirect_url.clone();
    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, redirect_url)],
        Json(json!({
            "status": "success",
            "message": "Role updated successfully"
        })),
    ))
}

/// GET /restore_user_role?email - Reapply the most recently backed-up role
pub async fn restore_user_role(
    Query(query): Query<RestoreUserRoleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = RoleService::new().await?;
    service.restore_role(&query.email).await?;

    let redirect_url = crate::config::config().server.redirect_url.clone();
    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, redirect_url)],
        Json(json!({
            "status": "success",
            "message": "Role restored successfully"
        })),
    ))
}

/// GET /roles - List all roles in storage order
pub async fn list_roles() -> Result<impl IntoResponse, ApiError> {
    let service = RoleService::new().await?;
    let roles = service.list_roles().await?;

    Ok(Json(json!({
        "status": "success",
        "roles": roles
    })))
}

/// GET /create_role/:role_name - Create a role, returning its id
pub async fn create_role(Path(role_name): Path<String>) -> Result<impl IntoResponse, ApiError> {
    if role_name.trim().is_empty() {
        return Err(ApiError::bad_request("Role name must not be empty"));
    }

    let service = RoleService::new().await?;
    let role_id = service.create_role(&role_name).await?;

    Ok(Json(json!({ "role_id": role_id })))
}

/// GET /redirect.html - Static confirmation page the 303 responses point at
pub async fn redirect_page() -> impl IntoResponse {
    Html(include_str!("../../static/redirect.html"))
}
