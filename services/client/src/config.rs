//! services/client/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use alttrack_core::domain::Environment;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub storage_url: String,
    pub environment: Environment,
    /// An `EnvFilter` directive such as `info` or `info,sqlx=warn`.
    pub log_filter: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Remote API & Storage ---
        let api_base_url = lookup("API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let storage_url = lookup("STORAGE_URL")
            .unwrap_or_else(|| "sqlite://alttrack.db?mode=rwc".to_string());

        // --- Environment & Logging ---
        let environment = match lookup("APP_ENVIRONMENT").as_deref() {
            None | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "APP_ENVIRONMENT".to_string(),
                    format!("'{}' is neither development nor production", other),
                ))
            }
        };

        let log_filter = match lookup("RUST_LOG") {
            Some(directive) => {
                EnvFilter::try_new(&directive).map_err(|e| {
                    ConfigError::InvalidValue(
                        "RUST_LOG".to_string(),
                        format!("'{}' is not a valid filter: {}", directive, e),
                    )
                })?;
                directive
            }
            None if environment == Environment::Development => "debug".to_string(),
            None => "info".to_string(),
        };

        // --- HTTP ---
        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("REQUEST_TIMEOUT_SECONDS".to_string(), e.to_string())
            })?,
            None => 30,
        };

        Ok(Self {
            api_base_url,
            storage_url,
            environment,
            log_filter,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
