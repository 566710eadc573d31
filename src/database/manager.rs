use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Centralized connection pool manager for the application database
pub struct DatabaseManager {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared application database pool
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        Self::instance().get_pool().await
    }

    /// Get existing pool or create it lazily on first use
    async fn get_pool(&self) -> Result<PgPool, DatabaseError> {
        // Fast path: try read lock
        {
            let pool = self.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let connection_string = Self::connection_string()?;
        let db_config = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connect_timeout_secs))
            .connect(&connection_string)
            .await?;

        {
            let mut slot = self.pool.write().await;
            *slot = Some(pool.clone());
        }

        info!("Created database pool");
        Ok(pool)
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        // Validate up front so a malformed URL fails with a clear error
        url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        Ok(base)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Apply the embedded schema to the configured database
    pub async fn apply_schema() -> Result<(), DatabaseError> {
        use sqlx::Executor;

        let pool = Self::pool().await?;
        let schema = include_str!("../../migrations/schema.sql");
        pool.execute(schema)
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

        info!("Applied database schema");
        Ok(())
    }
}
