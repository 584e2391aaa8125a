use serde::{Deserialize, Serialize};

/// User-creation payload forwarded to the platform's
/// `/api/v1/security/users/` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub active: bool,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<i32>,
}

/// Database-connection-definition payload forwarded to the platform's
/// `/api/v1/database/` endpoint. Optional flags default to the platform's
/// own defaults; the full payload is forwarded as-is, nulls included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseRequest {
    pub database_name: String,
    pub driver: String,
    pub engine: String,
    pub sqlalchemy_uri: String,
    #[serde(default)]
    pub allow_ctas: bool,
    #[serde(default)]
    pub allow_cvas: bool,
    #[serde(default)]
    pub allow_dml: bool,
    #[serde(default)]
    pub allow_file_upload: bool,
    #[serde(default)]
    pub allow_run_async: bool,
    #[serde(default)]
    pub cache_timeout: i64,
    #[serde(default = "default_true")]
    pub expose_in_sqllab: bool,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub force_ctas_schema: Option<String>,
    #[serde(default)]
    pub impersonate_user: bool,
    #[serde(default)]
    pub is_managed_externally: bool,
    #[serde(default)]
    pub server_cert: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_request_fills_platform_defaults() {
        let req: CreateDatabaseRequest = serde_json::from_value(serde_json::json!({
            "database_name": "examples",
            "driver": "psycopg2",
            "engine": "postgresql",
            "sqlalchemy_uri": "postgresql+psycopg2://u:p@db:5432/examples"
        }))
        .unwrap();

        assert!(!req.allow_ctas);
        assert!(!req.allow_dml);
        assert!(req.expose_in_sqllab);
        assert_eq!(req.cache_timeout, 0);
        assert_eq!(req.external_url, None);
    }

    #[test]
    fn database_request_forwards_nulls() {
        let req: CreateDatabaseRequest = serde_json::from_value(serde_json::json!({
            "database_name": "examples",
            "driver": "psycopg2",
            "engine": "postgresql",
            "sqlalchemy_uri": "postgresql+psycopg2://u:p@db:5432/examples"
        }))
        .unwrap();

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["server_cert"], serde_json::Value::Null);
        assert_eq!(body["expose_in_sqllab"], serde_json::json!(true));
    }

    #[test]
    fn user_request_round_trips_roles() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "username": "jdoe",
            "active": true,
            "email": "jdoe@example.com",
            "password": "s3cret",
            "first_name": "Jane",
            "last_name": "Doe",
            "roles": [3, 9]
        }))
        .unwrap();

        assert_eq!(req.roles, vec![3, 9]);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["roles"], serde_json::json!([3, 9]));
    }
}
