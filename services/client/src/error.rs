//! services/client/src/error.rs
//!
//! Errors that stop the client from starting.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Opening the local SQLite database failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The HTTP client could not be built (TLS backend, invalid settings).
    #[error("HTTP client Error: {0}")]
    Http(#[from] reqwest::Error),
}
