//! services/client/src/adapters/http.rs
//!
//! The REST adapter. It implements the `AuthApi` and `NotebookApi` ports from
//! the `core` crate on top of `reqwest`, attaching the bearer token when a
//! token source is configured.

use alttrack_core::domain::{
    CreateNotebookInput, Credentials, LoginResponse, Notebook, RegisterResponse,
    UpdateNotebookInput,
};
use alttrack_core::ports::{AccessTokenSource, AuthApi, NotebookApi, PortError, PortResult};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter for the remote AltTrack API.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token_source: Option<Arc<dyn AccessTokenSource>>,
}

impl RestClient {
    /// Creates a client whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, http))
    }

    pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source: None,
        }
    }

    /// Every request sent afterwards carries the source's current token, if any.
    pub fn with_token_source(mut self, source: Arc<dyn AccessTokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match self.token_source.as_ref().and_then(|s| s.access_token()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> PortResult<Response> {
        let response = builder.send().await.map_err(transport_error)?;
        ensure_success(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> PortResult<T> {
        let response = self.send(builder).await?;
        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|e| PortError::Decode(e.to_string()))
    }
}

//=========================================================================================
// Response Helpers
//=========================================================================================

fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Unreachable(e.to_string())
}

/// Passes 2xx responses through; anything else becomes `PortError::Http`.
async fn ensure_success(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %body, "Request rejected by the server");
    Err(PortError::Http {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}

/// Reads `message` from a JSON error body. Validation errors send a list of strings.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthApi for RestClient {
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginResponse> {
        debug!(username = %credentials.username, "POST /auth/login");
        self.send_json(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    async fn register(&self, credentials: &Credentials) -> PortResult<RegisterResponse> {
        debug!(username = %credentials.username, "POST /auth/register");
        self.send_json(self.request(Method::POST, "/auth/register").json(credentials))
            .await
    }
}

#[async_trait]
impl NotebookApi for RestClient {
    async fn list_notebooks(&self) -> PortResult<Vec<Notebook>> {
        self.send_json(self.request(Method::GET, "/notebooks")).await
    }

    async fn get_notebook(&self, id: Uuid) -> PortResult<Notebook> {
        self.send_json(self.request(Method::GET, &format!("/notebooks/{}", id)))
            .await
    }

    async fn create_notebook(&self, input: &CreateNotebookInput) -> PortResult<Notebook> {
        self.send_json(self.request(Method::POST, "/notebooks").json(input))
            .await
    }

    async fn update_notebook(&self, id: Uuid, input: &UpdateNotebookInput) -> PortResult<Notebook> {
        self.send_json(
            self.request(Method::PUT, &format!("/notebooks/{}", id))
                .json(input),
        )
        .await
    }

    async fn delete_notebook(&self, id: Uuid) -> PortResult<()> {
        self.send(self.request(Method::DELETE, &format!("/notebooks/{}", id)))
            .await?;
        Ok(())
    }
}
