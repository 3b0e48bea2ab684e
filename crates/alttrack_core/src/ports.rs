//! crates/alttrack_core/src/ports.rs
//!
//! Defines the service contracts (traits) the stores depend on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP client and of the durable storage engine.

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{
    CreateNotebookInput, Credentials, LoginResponse, Notebook, RegisterResponse,
    UpdateNotebookInput,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, storage).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The request never got a response.
    #[error("Server unreachable: {0}")]
    Unreachable(String),
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PortError {
    pub fn status(&self) -> Option<u16> {
        match self {
            PortError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of the server's error body, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PortError::Http { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Remote API Ports
//=========================================================================================

/// `POST /auth/login` and `POST /auth/register`.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginResponse>;

    async fn register(&self, credentials: &Credentials) -> PortResult<RegisterResponse>;
}

/// CRUD against `/notebooks`.
#[async_trait]
pub trait NotebookApi: Send + Sync {
    async fn list_notebooks(&self) -> PortResult<Vec<Notebook>>;

    async fn get_notebook(&self, id: Uuid) -> PortResult<Notebook>;

    async fn create_notebook(&self, input: &CreateNotebookInput) -> PortResult<Notebook>;

    async fn update_notebook(&self, id: Uuid, input: &UpdateNotebookInput) -> PortResult<Notebook>;

    async fn delete_notebook(&self, id: Uuid) -> PortResult<()>;
}

/// Supplies the bearer token for authenticated requests.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

//=========================================================================================
// Durable Storage Port
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageWrite {
    Put { key: String, value: String },
    Remove { key: String },
}

impl StorageWrite {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        StorageWrite::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        StorageWrite::Remove { key: key.into() }
    }
}

/// String key-value storage that survives restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    /// Applies every write or none of them.
    async fn apply(&self, writes: &[StorageWrite]) -> PortResult<()>;
}
