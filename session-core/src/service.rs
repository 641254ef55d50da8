//! Session lifecycle
//!
//! The service mints sessions for already authenticated users, validates presented bearer tokens
//! and revokes sessions on sign-out. It holds no session data between calls: every validation
//! reads the store again, so a revoke is visible to the very next validation.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use derivative::Derivative;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::session::{Session, SessionId};
use crate::store::{SessionStore, StoreError};
use crate::token::{self, SessionToken};
use crate::{compare, hasher};

/// Default session lifetime
pub const DEFAULT_TTL_SECONDS: i64 = 60 * 60 * 24;

/// Longest accepted session lifetime
pub const MAX_TTL_SECONDS: i64 = 60 * 60 * 24 * 366;

/// Reason for rejecting a presented token
///
/// Distinguished only internally. Callers must treat every rejection as "not authenticated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("malformed token")]
    Malformed,
    #[error("unknown session")]
    NotFound,
    #[error("secret mismatch")]
    SecretMismatch,
    #[error("session expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Session creation failed")]
    SessionCreationFailed(#[source] StoreError),
    #[error("Session token rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How an error should be surfaced to the external caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The bearer is not authenticated
    Unauthenticated,
    /// Infrastructure failure, the caller may retry
    Unavailable,
}

impl Error {
    pub fn category(&self) -> Category {
        match self {
            Self::Rejected(_) => Category::Unauthenticated,
            Self::SessionCreationFailed(_) | Self::Store(_) => Category::Unavailable,
        }
    }

    /// Rejection reason, if the token was rejected
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(rejection) => Some(*rejection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Session ttl has to be between 1 and {MAX_TTL_SECONDS} seconds, got {0}")]
pub struct InvalidTtl(pub i64);

/// Session policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative)]
#[derivative(Default(new = "true"))]
pub struct Policy {
    /// Session lifetime, counted from creation
    #[derivative(Default(value = "TimeDelta::seconds(DEFAULT_TTL_SECONDS)"))]
    ttl: TimeDelta,
}

impl Policy {
    /// Policy with the session lifetime of `ttl_seconds`
    ///
    /// The lifetime has to be positive and at most [`MAX_TTL_SECONDS`].
    pub fn with_ttl_seconds(ttl_seconds: i64) -> Result<Self, InvalidTtl> {
        if !(1..=MAX_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(InvalidTtl(ttl_seconds));
        }

        let ttl = TimeDelta::try_seconds(ttl_seconds).ok_or(InvalidTtl(ttl_seconds))?;
        Ok(Self { ttl })
    }

    /// Session lifetime, counted from creation
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

/// Session management on top of a store
#[derive(Debug, Clone)]
pub struct SessionService<S, C = SystemClock> {
    store: S,
    clock: C,
    policy: Policy,
}

impl<S: SessionStore> SessionService<S> {
    /// Creates the service using the wall clock and the default policy
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: SessionStore, C: Clock> SessionService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            policy: Policy::default(),
        }
    }

    /// Replaces the session policy
    pub fn with_policy(self, policy: Policy) -> Self {
        Self { policy, ..self }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Accesses the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a new session, returning the token to hand out to the caller
    ///
    /// Must be called only after the caller authenticated the user.
    pub async fn create_session(&self) -> Result<SessionToken, Error> {
        let id = SessionId::from(token::generate());
        let secret = token::generate();

        let session = Session {
            id: id.clone(),
            secret_hash: hasher::hash(secret.as_bytes()),
            created_at: self.now(),
        };

        if let Err(err) = self.store.insert(&session).await {
            warn!(error = %err, "Cannot store new session");
            return Err(Error::SessionCreationFailed(err));
        }

        info!(session_id = %id, "Session created");
        Ok(SessionToken::new(id, secret))
    }

    /// Validates a bearer token, returning the live session it authenticates
    ///
    /// An expired session is deleted from the store before rejecting it.
    pub async fn validate_token(&self, token: &str) -> Result<Session, Error> {
        let result = self.authenticate(token).await;

        match &result {
            Ok(session) => debug!(session_id = %session.id, "Session token accepted"),
            Err(Error::Rejected(rejection)) => {
                debug!(reason = ?rejection, "Session token rejected")
            }
            Err(err) => warn!(error = %err, "Cannot validate session token"),
        }

        result
    }

    /// Revokes the session; revoking an unknown session is not an error
    pub async fn revoke_session(&self, id: &SessionId) -> Result<(), StoreError> {
        self.store.delete_by_id(id).await?;
        info!(session_id = %id, "Session revoked");
        Ok(())
    }

    /// Deletes all expired sessions, returning the number of deleted sessions
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let Some(cutoff) = self.now().checked_sub_signed(self.policy.ttl) else {
            debug!("Expiration cutoff precedes representable time, nothing to purge");
            return Ok(0);
        };

        let purged = self.store.delete_created_until(cutoff).await?;
        debug!(purged, "Expired sessions purged");
        Ok(purged)
    }

    async fn authenticate(&self, token: &str) -> Result<Session, Error> {
        let (id, secret) = token::decode(token).map_err(|_| Rejection::Malformed)?;
        let id = SessionId::from(id);

        let session = self
            .store
            .fetch_by_id(&id)
            .await?
            .ok_or(Rejection::NotFound)?;

        let presented = hasher::hash(secret.as_bytes());
        if !compare::equal(presented.as_bytes(), session.secret_hash.as_bytes()) {
            debug!(session_id = %session.id, "Secret mismatch for known session");
            return Err(Rejection::SecretMismatch.into());
        }

        if session.is_expired(self.now(), self.policy.ttl) {
            self.store.delete_by_id(&session.id).await?;
            debug!(session_id = %session.id, "Expired session deleted");
            return Err(Rejection::Expired.into());
        }

        Ok(session)
    }

    /// Current time truncated to the stored precision
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(0)
    }
}
