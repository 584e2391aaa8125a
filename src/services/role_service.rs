use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Role, RoleAssignment, RoleBackup};

/// Role id reserved as the baseline capability. Reassignment never deletes
/// assignment rows holding this role.
pub const DEFAULT_ROLE_ID: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum RoleServiceError {
    #[error("No user found for email: {0}")]
    UserNotFound(String),
    #[error("No role found with id: {0}")]
    RoleNotFound(i32),
    #[error("No role backup recorded for user: {0}")]
    BackupNotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

/// Result of a completed reassignment or restore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignOutcome {
    pub user_id: i32,
    pub role_id: i32,
    pub assignment_id: i32,
}

pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub async fn new() -> Result<Self, RoleServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Replace a user's non-default role assignments with `new_role_id`.
    ///
    /// Backs up the user's current assignments, clears every non-default
    /// row, and inserts the new binding, all inside one transaction so a
    /// failure at any step leaves the tables exactly as they were.
    pub async fn reassign_role(
        &self,
        email: &str,
        new_role_id: i32,
    ) -> Result<ReassignOutcome, RoleServiceError> {
        let user_id = self.resolve_user(email).await?;

        let mut tx = self.pool.begin().await?;
        let assignment = Self::backup_clear_assign(&mut tx, user_id, new_role_id).await?;
        tx.commit().await?;

        info!(user_id, new_role_id, assignment_id = assignment.id, "Reassigned user role");
        Ok(ReassignOutcome { user_id, role_id: new_role_id, assignment_id: assignment.id })
    }

    /// Reapply the role a user held before their most recent reassignment.
    ///
    /// "Most recent" is the non-default backup row with the latest
    /// created_at, ties broken by highest id. The default role is skipped
    /// because reassignment never removes it, so it never needs restoring.
    /// The restore runs the same backup/clear/assign sequence, so it appends
    /// its own backup rows and is itself reversible.
    pub async fn restore_role(&self, email: &str) -> Result<ReassignOutcome, RoleServiceError> {
        let user_id = self.resolve_user(email).await?;

        let backup: Option<RoleBackup> = sqlx::query_as(
            "SELECT id, user_id, original_role_id, created_at FROM original_role_backups \
             WHERE user_id = $1 AND original_role_id <> $2 \
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(DEFAULT_ROLE_ID)
        .fetch_optional(&self.pool)
        .await?;

        let original_role_id = backup
            .map(|backup| backup.original_role_id)
            .ok_or_else(|| RoleServiceError::BackupNotFound(email.to_string()))?;

        let mut tx = self.pool.begin().await?;
        let assignment = Self::backup_clear_assign(&mut tx, user_id, original_role_id).await?;
        tx.commit().await?;

        info!(user_id, original_role_id, assignment_id = assignment.id, "Restored user role from backup");
        Ok(ReassignOutcome { user_id, role_id: original_role_id, assignment_id: assignment.id })
    }

    /// All roles in storage order (no ordering guarantee)
    pub async fn list_roles(&self) -> Result<Vec<Role>, RoleServiceError> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM ab_role")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    /// Create a role, drawing the id from a sequence so concurrent calls
    /// always receive distinct ids
    pub async fn create_role(&self, name: &str) -> Result<i32, RoleServiceError> {
        let (role_id,): (i32,) = sqlx::query_as(
            "INSERT INTO ab_role (id, name) \
             VALUES (nextval('bridge_role_id_seq'), $1) RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        info!(role_id, name, "Created role");
        Ok(role_id)
    }

    async fn resolve_user(&self, email: &str) -> Result<i32, RoleServiceError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM ab_user WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(id,)| id)
            .ok_or_else(|| RoleServiceError::UserNotFound(email.to_string()))
    }

    /// The three-step mutation shared by reassign and restore. Runs inside
    /// the caller's transaction.
    ///
    /// The target role is verified first, under FOR SHARE so a concurrent
    /// deletion cannot slip between the check and the insert.
    ///
    /// The backup insert is deliberately unconditional and non-idempotent:
    /// every call appends the user's current assignments, even when there
    /// are none, so the backup table is a full append-only history.
    async fn backup_clear_assign(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        new_role_id: i32,
    ) -> Result<RoleAssignment, RoleServiceError> {
        let role: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM ab_role WHERE id = $1 FOR SHARE")
                .bind(new_role_id)
                .fetch_optional(&mut **tx)
                .await?;
        if role.is_none() {
            return Err(RoleServiceError::RoleNotFound(new_role_id));
        }

        sqlx::query(
            "INSERT INTO original_role_backups (user_id, original_role_id) \
             SELECT user_id, role_id FROM ab_user_role WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM ab_user_role WHERE user_id = $1 AND role_id <> $2")
            .bind(user_id)
            .bind(DEFAULT_ROLE_ID)
            .execute(&mut **tx)
            .await?;

        let assignment: RoleAssignment = sqlx::query_as(
            "INSERT INTO ab_user_role (id, user_id, role_id) \
             VALUES (nextval('bridge_user_role_id_seq'), $1, $2) \
             RETURNING id, user_id, role_id",
        )
        .bind(user_id)
        .bind(new_role_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(assignment)
    }
}
