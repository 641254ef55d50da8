//! Session persistence
//!
//! [`SessionStore`] is the persistence boundary of the sessions. It is passed explicitly to the
//! [`SessionService`](crate::SessionService), so any implementation of the contract can back it.

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::session::{Session, SessionId};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session id collision")]
    DuplicateId,
    #[error("Session store unavailable")]
    Unavailable(#[from] sqlx::Error),
    #[error("Session {id} is malformed in the store: invalid {field}")]
    CorruptRecord { id: SessionId, field: &'static str },
}

/// Durable sessions table keyed by session id
pub trait SessionStore: Send + Sync {
    /// Stores a new session, failing with [`StoreError::DuplicateId`] if the id is taken
    fn insert(&self, session: &Session) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetches the session with the given id
    fn fetch_by_id(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Deletes the session with the given id; deleting a missing session is not an error
    fn delete_by_id(&self, id: &SessionId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes all sessions created at or before `cutoff` (inclusive), returning the number of
    /// deleted sessions
    fn delete_created_until(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
