//! crates/alttrack_core/src/token.rs
//!
//! Client-side decoding of the access token's claims.
//!
//! The signature is never checked: the decoded claims are UI hints
//! (expiry, environment), not a basis for trust decisions.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};

use crate::domain::Environment;

/// Base64url, with or without trailing padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in the middle segment of the token.
///
/// Any JSON value is accepted; claims of an unexpected type read as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TokenPayload {
    claims: JsonValue,
}

impl TokenPayload {
    /// Expiration, seconds since the Unix epoch. Fractional values are truncated.
    pub fn exp(&self) -> Option<i64> {
        let exp = self.claims.get("exp")?;
        exp.as_i64().or_else(|| exp.as_f64().map(|secs| secs.trunc() as i64))
    }

    /// The `environment` claim, when it is a string.
    pub fn environment(&self) -> Option<&str> {
        self.claims.get("environment")?.as_str()
    }

    pub fn get_claim(&self, key: &str) -> Option<&JsonValue> {
        self.claims.get(key)
    }
}

struct CachedPayload {
    token: String,
    payload: Arc<TokenPayload>,
}

/// Decodes token payloads, remembering the last successful decode.
#[derive(Default)]
pub struct TokenCodec {
    cache: Mutex<Option<CachedPayload>>,
}

impl TokenCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the payload of a `header.payload.signature` token.
    ///
    /// Decoding the same string twice returns the same `Arc` without parsing
    /// again. A different string replaces the cache; a failure empties it.
    pub fn decode(&self, token: &str) -> Option<Arc<TokenPayload>> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(cached) = cache.as_ref() {
            if cached.token == token {
                return Some(cached.payload.clone());
            }
        }

        match parse_payload(token) {
            Some(payload) => {
                let payload = Arc::new(payload);
                *cache = Some(CachedPayload {
                    token: token.to_owned(),
                    payload: payload.clone(),
                });
                Some(payload)
            }
            None => {
                *cache = None;
                None
            }
        }
    }

    pub fn is_expired(&self, token: &str) -> bool {
        self.is_expired_at(token, Utc::now())
    }

    /// True when the token cannot be decoded, has no `exp`, or `exp <= now`.
    pub fn is_expired_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.decode(token).and_then(|payload| payload.exp()) {
            Some(exp) => exp <= now.timestamp(),
            None => true,
        }
    }

    pub fn environment_of(&self, token: Option<&str>) -> Environment {
        token
            .and_then(|t| self.decode(t))
            .and_then(|payload| payload.environment().map(Environment::from_claim))
            .unwrap_or(Environment::Production)
    }

    pub fn clear_cache(&self) {
        *self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

fn parse_payload(token: &str) -> Option<TokenPayload> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let bytes = PAYLOAD_ENGINE.decode(segments[1]).ok()?;
    serde_json::from_slice(&bytes).ok()
}
