use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role reference entity from the platform-owned `ab_role` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
}
