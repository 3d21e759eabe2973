//! Error types for the bootstrap binary.
//!
//! [`BootstrapError`] wraps every failure that can stop startup so `main`
//! can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: azeuqer_core::ConfigError,
    },

    /// A store connection or migration failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying data layer error.
        #[from]
        source: azeuqer_db::DbError,
    },

    /// An engine query failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: azeuqer_core::EngineError,
    },
}
