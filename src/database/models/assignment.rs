use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row from the platform-owned `ab_user_role` table binding a user to a role
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleAssignment {
    pub id: i32,
    pub user_id: i32,
    pub role_id: i32,
}

/// Row from the bridge-owned `original_role_backups` table recording the
/// role a user held immediately before a reassignment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleBackup {
    pub id: i64,
    pub user_id: i32,
    pub original_role_id: i32,
    pub created_at: DateTime<Utc>,
}
