//! `PostgreSQL` pool for the `players` table.
//!
//! Queries are built at runtime so the crate compiles without a live
//! database. The schema ships with the crate and is applied by
//! [`PostgresPool::run_migrations`].

use std::time::Duration;

use azeuqer_core::config::InfrastructureConfig;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::error::DbError;

/// How long a request waits for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Embedded `migrations/` directory.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connection pool handle to `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Connect with the URL and pool size from the infrastructure config.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Postgres`] if the connection fails.
    pub async fn connect(infra: &InfrastructureConfig) -> Result<Self, DbError> {
        let options: PgConnectOptions = infra
            .postgres_url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("Invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(infra.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = infra.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Bring the `players` schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if any migration fails.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// The underlying pool, for [`crate::PgPlayerStore`].
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}
