use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Process-wide connection pool for the BI platform's metadata database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Get the shared pool, connecting lazily on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let pool = POOL.get_or_try_init(Self::connect).await?;
        Ok(pool.clone())
    }

    async fn connect() -> Result<PgPool, DatabaseError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        // Sanity-check the URL before handing it to sqlx
        url::Url::parse(&database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let settings = &crate::config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .connect(&database_url)
            .await?;

        info!("Connected database pool ({} max connections)", settings.max_connections);
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Create the bridge-owned table and id sequences if they are missing.
    ///
    /// `original_role_backups` belongs to this service; `ab_role` and
    /// `ab_user_role` belong to the platform schema, so for those we only
    /// seed dedicated sequences past the current max id.
    pub async fn ensure_schema() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS original_role_backups ( \
                id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY, \
                user_id INTEGER NOT NULL, \
                original_role_id INTEGER NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now() \
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE SEQUENCE IF NOT EXISTS bridge_user_role_id_seq")
            .execute(&pool)
            .await?;
        sqlx::query("CREATE SEQUENCE IF NOT EXISTS bridge_role_id_seq")
            .execute(&pool)
            .await?;

        // Never move a sequence backwards: seed to whichever is larger,
        // its own position or the table's current max id.
        sqlx::query(
            "SELECT setval('bridge_user_role_id_seq', \
                GREATEST((SELECT last_value FROM bridge_user_role_id_seq), \
                         (SELECT COALESCE(MAX(id), 0) + 1 FROM ab_user_role)), \
                false)",
        )
        .execute(&pool)
        .await?;
        sqlx::query(
            "SELECT setval('bridge_role_id_seq', \
                GREATEST((SELECT last_value FROM bridge_role_id_seq), \
                         (SELECT COALESCE(MAX(id), 0) + 1 FROM ab_role)), \
                false)",
        )
        .execute(&pool)
        .await?;

        info!("Verified backup table and id sequences");
        Ok(())
    }
}
