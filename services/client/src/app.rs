//! services/client/src/app.rs
//!
//! Wires the adapters into the core stores.

use crate::adapters::{RestClient, SqliteKeyValueStore};
use crate::config::Config;
use crate::error::ClientError;
use alttrack_core::notebooks::NotebookStore;
use alttrack_core::preferences::ThemeStore;
use alttrack_core::session::SessionStore;
use alttrack_core::token::TokenCodec;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// The long-lived stores of one client instance.
pub struct AppContext {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub notebooks: Arc<NotebookStore>,
    pub theme: Arc<ThemeStore>,
}

impl AppContext {
    pub async fn build(config: Config) -> Result<Self, ClientError> {
        let config = Arc::new(config);

        // --- 1. Local Storage ---
        info!("Opening local storage...");
        let pool = connect_storage(&config.storage_url).await?;
        let storage = Arc::new(SqliteKeyValueStore::new(pool));
        storage.run_migrations().await?;

        // --- 2. Session & Preferences ---
        let auth_client = RestClient::new(config.api_base_url.as_str(), config.request_timeout)?;
        let codec = Arc::new(TokenCodec::new());
        let session = Arc::new(
            SessionStore::restore(Arc::new(auth_client.clone()), storage.clone(), codec).await,
        );
        let theme = Arc::new(ThemeStore::restore(storage).await);

        // --- 3. Notebooks ---
        // Shares the connection pool of the auth client but signs every request.
        let notebook_client = auth_client.with_token_source(session.clone());
        let notebooks = Arc::new(NotebookStore::new(Arc::new(notebook_client)));

        Ok(Self {
            config,
            session,
            notebooks,
            theme,
        })
    }
}

/// Opens the SQLite pool behind `url`.
pub async fn connect_storage(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = if url.contains(":memory:") {
        // Every connection to an in-memory database opens a fresh, empty one.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };
    options.connect(url).await
}
