//! Session data

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;

use crate::hasher::SecretHash;

/// Newtype for the session id
///
/// The id is the public half of a bearer token. It is never secret and safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted session
///
/// Sessions are immutable once written. They are destroyed either explicitly, or lazily when a
/// validation finds them expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    /// Digest of the secret half of the token
    pub secret_hash: SecretHash,
    /// Issuance time, in whole seconds
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Checks if the session outlived `ttl` at `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.created_at >= ttl
    }

    /// Public-safe view of the session
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            created_at: self.created_at,
        }
    }
}

/// Session representation safe to hand out to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: SessionId,
    /// Unix seconds
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}
