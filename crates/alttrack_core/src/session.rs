//! crates/alttrack_core/src/session.rs
//!
//! The authentication store: the current access token and identity, kept in
//! an observable container and mirrored to durable storage.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{AuthSession, Credentials, Environment, Identity};
use crate::observable::Observable;
use crate::ports::{AccessTokenSource, AuthApi, KeyValueStore, PortError, StorageWrite};
use crate::token::TokenCodec;

pub const ACCESS_TOKEN_KEY: &str = "alttrack_access_token";
pub const CURRENT_USER_KEY: &str = "alttrack_current_user";

const LOGIN_FAILED: &str = "Une erreur est survenue lors de la connexion.";
const REGISTER_FAILED: &str = "Une erreur est survenue lors de l'inscription.";

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Identifiants invalides. Veuillez réessayer.")]
    InvalidCredentials,
    #[error("Impossible de contacter le serveur. Veuillez vérifier votre connexion.")]
    ServerUnreachable,
    #[error("{0}")]
    Other(String),
}

impl From<PortError> for AuthError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Unreachable(_) => AuthError::ServerUnreachable,
            PortError::Http { status: 401, .. } => AuthError::InvalidCredentials,
            other => AuthError::Other(
                other
                    .server_message()
                    .unwrap_or(LOGIN_FAILED)
                    .to_string(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("Ce nom d'utilisateur existe déjà. Veuillez en choisir un autre.")]
    UsernameTaken,
    #[error("Données invalides. Vérifiez vos informations.")]
    InvalidInput,
    #[error("Impossible de contacter le serveur. Veuillez vérifier votre connexion.")]
    ServerUnreachable,
    #[error("{0}")]
    Other(String),
}

impl From<PortError> for RegisterError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Unreachable(_) => RegisterError::ServerUnreachable,
            PortError::Http { status: 409, .. } => RegisterError::UsernameTaken,
            PortError::Http { status: 400, .. } => RegisterError::InvalidInput,
            other => RegisterError::Other(
                other
                    .server_message()
                    .unwrap_or(REGISTER_FAILED)
                    .to_string(),
            ),
        }
    }
}

//=========================================================================================
// SessionStore
//=========================================================================================

pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStore>,
    codec: Arc<TokenCodec>,
    state: Observable<Option<AuthSession>>,
}

impl SessionStore {
    /// Builds the store, reloading a session persisted by a previous run.
    ///
    /// A missing token, a missing identity, or an identity that does not parse
    /// all yield an unauthenticated store.
    pub async fn restore(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStore>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        let restored = load_persisted(storage.as_ref()).await;
        match &restored {
            Some(session) => info!(
                username = %session.identity.username,
                "Restored persisted session"
            ),
            None => debug!("No persisted session, starting unauthenticated"),
        }

        Self {
            api,
            storage,
            codec,
            state: Observable::new(restored),
        }
    }

    /// Authenticates against the backend and persists the new session.
    ///
    /// On failure the current session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self.api.login(&credentials).await.map_err(|e| {
            warn!(username, error = %e, "Login failed");
            AuthError::from(e)
        })?;

        let session = AuthSession {
            access_token: response.access_token,
            identity: response.user,
        };
        self.state.set(Some(session.clone()));
        info!(
            username = %session.identity.username,
            environment = self.environment().as_str(),
            "Login succeeded"
        );

        self.persist(&session).await;
        Ok(session)
    }

    /// Creates an account. The session is not changed; callers log in afterwards.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, RegisterError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.api.register(&credentials).await {
            Ok(response) => {
                info!(username, "Account registered");
                Ok(response.into_identity())
            }
            Err(e) => {
                warn!(username, error = %e, "Registration failed");
                Err(RegisterError::from(e))
            }
        }
    }

    /// Forgets the session in memory and in storage. Never fails.
    pub async fn logout(&self) {
        self.state.set(None);
        self.codec.clear_cache();

        let writes = [
            StorageWrite::remove(ACCESS_TOKEN_KEY),
            StorageWrite::remove(CURRENT_USER_KEY),
        ];
        if let Err(e) = self.storage.apply(&writes).await {
            warn!(error = %e, "Could not remove the persisted session");
        }
        info!("Logged out");
    }

    pub fn current_session(&self) -> Option<AuthSession> {
        self.state.get()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.with(|s| s.as_ref().map(|s| s.identity.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(Option::is_some)
    }

    /// Environment advertised by the current token; production without one.
    pub fn environment(&self) -> Environment {
        self.state
            .with(|s| self.codec.environment_of(s.as_ref().map(|s| s.access_token.as_str())))
    }

    /// True when there is no session or its token has expired.
    pub fn is_token_expired(&self) -> bool {
        self.state.with(|s| match s {
            Some(session) => self.codec.is_expired(&session.access_token),
            None => true,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.state.subscribe()
    }

    /// Token and identity are written in one batch.
    async fn persist(&self, session: &AuthSession) {
        let identity_json = match serde_json::to_string(&session.identity) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize identity, session not persisted");
                return;
            }
        };

        let writes = [
            StorageWrite::put(ACCESS_TOKEN_KEY, session.access_token.clone()),
            StorageWrite::put(CURRENT_USER_KEY, identity_json),
        ];
        if let Err(e) = self.storage.apply(&writes).await {
            warn!(error = %e, "Could not persist the session");
        }
    }
}

impl AccessTokenSource for SessionStore {
    fn access_token(&self) -> Option<String> {
        self.state.with(|s| s.as_ref().map(|s| s.access_token.clone()))
    }
}

async fn load_persisted(storage: &dyn KeyValueStore) -> Option<AuthSession> {
    let token = match storage.get(ACCESS_TOKEN_KEY).await {
        Ok(Some(token)) if !token.is_empty() => token,
        Ok(_) => return None,
        Err(e) => {
            warn!(error = %e, "Could not read the persisted token");
            return None;
        }
    };

    let identity_json = match storage.get(CURRENT_USER_KEY).await {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Could not read the persisted identity");
            return None;
        }
    };

    match serde_json::from_str::<Identity>(&identity_json) {
        Ok(identity) => Some(AuthSession {
            access_token: token,
            identity,
        }),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed persisted identity");
            None
        }
    }
}
