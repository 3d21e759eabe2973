//! Error types for the data layer.
//!
//! Backend failures are carried as [`DbError`] inside this crate and
//! converted to the engine's [`StoreError`] and [`CohortError`] at the trait
//! boundary. Conflicts and uniqueness violations never reach here as
//! `DbError`; the stores translate those directly.

use azeuqer_core::{CohortError, StoreError};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row holds a value outside its Rust type's range.
    #[error("Invalid row for player {player_id}: {reason}")]
    InvalidRow {
        /// Player whose row is invalid.
        player_id: i64,
        /// What is wrong with it.
        reason: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}

impl From<DbError> for CohortError {
    fn from(err: DbError) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}
