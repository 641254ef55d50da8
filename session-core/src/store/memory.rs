//! In-memory session store

use std::collections::{HashMap, hash_map};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{SessionStore, StoreError};
use crate::session::{Session, SessionId};

/// Session store keeping sessions in a process-local map
///
/// Sessions do not survive a restart. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl SessionStore for MemoryStore {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.entry(session.id.clone()) {
            hash_map::Entry::Vacant(entry) => {
                entry.insert(session.clone());
                Ok(())
            }
            hash_map::Entry::Occupied(_) => Err(StoreError::DuplicateId),
        }
    }

    async fn fetch_by_id(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_created_until(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at > cutoff);
        Ok((before - sessions.len()) as u64)
    }
}
