use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, DatabaseConfig, Service};

static API_MIGRATOR: Migrator = sqlx::migrate!("./migrations/api");
static AUTH_MIGRATOR: Migrator = sqlx::migrate!("./migrations/auth");

/// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Migration(#[from] MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Turn a unique-constraint failure into `UniqueViolation(message)`,
    /// passing every other error through.
    pub fn on_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                DatabaseError::UniqueViolation(message.into())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Connection-pool gauges sampled by the metrics collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
}

impl PoolStats {
    pub fn active(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }
}

/// Pool construction, migrations and health probes
pub struct DatabaseManager;

impl DatabaseManager {
    fn options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .max_lifetime(config.max_lifetime())
    }

    /// Build a pool without touching the network; connections open on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.connection_url()?;
        Ok(Self::options(config).connect_lazy(&url)?)
    }

    /// Build a pool and verify connectivity.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.connection_url()?;
        let pool = Self::options(config).connect(&url).await?;
        Self::health_check(&pool).await?;
        info!(
            database = %config.name,
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(pool)
    }

    /// Apply the embedded migrations for `service`.
    pub async fn migrate(pool: &PgPool, service: Service) -> Result<(), DatabaseError> {
        let migrator = match service {
            Service::Api => &API_MIGRATOR,
            Service::Auth => &AUTH_MIGRATOR,
        };
        migrator.run(pool).await?;
        info!(service = service.name(), "Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    pub fn pool_stats(pool: &PgPool) -> PoolStats {
        PoolStats {
            size: pool.size(),
            idle: pool.num_idle() as u32,
        }
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
