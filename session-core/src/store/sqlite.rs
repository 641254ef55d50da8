//! SQLite backed session store

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{SessionStore, StoreError};
use crate::hasher::SecretHash;
use crate::session::{Session, SessionId};

const CREATE_TABLE: &str = "create table if not exists session (
    id text not null primary key,
    secret_hash blob not null,
    created_at integer not null
) strict";

/// Session store on top of the SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    /// Creates the store, creating the sessions table if it doesn't exist yet
    pub async fn new(db: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&db).await?;
        debug!("Session table ready");
        Ok(Self { db })
    }

    /// Accesses the DB pool
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }
}

impl SessionStore for SqliteStore {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let insertion = sqlx::query(
            "insert into session (id, secret_hash, created_at) values (?, ?, ?) on conflict(id) do nothing",
        )
        .bind(&session.id)
        .bind(session.secret_hash.as_bytes().as_slice())
        .bind(session.created_at.timestamp())
        .execute(&self.db)
        .await?;

        if insertion.rows_affected() == 0 {
            return Err(StoreError::DuplicateId);
        }

        Ok(())
    }

    async fn fetch_by_id(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let row: Option<(SessionId, Vec<u8>, i64)> =
            sqlx::query_as("select id, secret_hash, created_at from session where id = ?")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        let Some((id, secret_hash, created_at)) = row else {
            return Ok(None);
        };

        let Some(secret_hash) = SecretHash::from_slice(&secret_hash) else {
            return Err(StoreError::CorruptRecord {
                id,
                field: "secret_hash",
            });
        };

        let Some(created_at) = DateTime::from_timestamp(created_at, 0) else {
            return Err(StoreError::CorruptRecord {
                id,
                field: "created_at",
            });
        };

        Ok(Some(Session {
            id,
            secret_hash,
            created_at,
        }))
    }

    async fn delete_by_id(&self, id: &SessionId) -> Result<(), StoreError> {
        sqlx::query("delete from session where id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_created_until(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let deletion = sqlx::query("delete from session where created_at <= ?")
            .bind(cutoff.timestamp())
            .execute(&self.db)
            .await?;
        Ok(deletion.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::hasher;

    async fn setup_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::new(pool).await.unwrap()
    }

    fn session(id: &str, created_at: i64) -> Session {
        Session {
            id: SessionId::from(id),
            secret_hash: hasher::hash(id.as_bytes()),
            created_at: DateTime::from_timestamp(created_at, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch() {
        let store = setup_store().await;
        let stored = session("session1", 1_700_000_000);

        store.insert(&stored).await.unwrap();

        let fetched = store.fetch_by_id(&stored.id).await.unwrap();
        assert_eq!(fetched, Some(stored));
    }

    #[tokio::test]
    async fn fetch_missing() {
        let store = setup_store().await;
        let fetched = store.fetch_by_id(&SessionId::from("missing")).await.unwrap();
        assert_eq!(fetched, None);
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let store = setup_store().await;
        let first = session("session1", 1_700_000_000);
        store.insert(&first).await.unwrap();

        let mut second = session("session1", 1_700_000_100);
        second.secret_hash = hasher::hash(b"other");
        let err = store.insert(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId));

        // The first session is untouched
        let fetched = store.fetch_by_id(&first.id).await.unwrap();
        assert_eq!(fetched, Some(first));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = setup_store().await;
        let stored = session("session1", 1_700_000_000);
        store.insert(&stored).await.unwrap();

        store.delete_by_id(&stored.id).await.unwrap();
        assert_eq!(store.fetch_by_id(&stored.id).await.unwrap(), None);

        store.delete_by_id(&stored.id).await.unwrap();
        store.delete_by_id(&SessionId::from("never")).await.unwrap();
    }

    #[tokio::test]
    async fn table_creation_is_idempotent() {
        let store = setup_store().await;
        let stored = session("session1", 1_700_000_000);
        store.insert(&stored).await.unwrap();

        let reopened = SqliteStore::new(store.db().clone()).await.unwrap();
        assert_eq!(reopened.fetch_by_id(&stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn corrupt_secret_hash_detected() {
        let store = setup_store().await;
        sqlx::query("insert into session (id, secret_hash, created_at) values (?, ?, ?)")
            .bind("corrupt")
            .bind(vec![0u8; 16])
            .bind(1_700_000_000i64)
            .execute(store.db())
            .await
            .unwrap();

        let err = store
            .fetch_by_id(&SessionId::from("corrupt"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptRecord {
                field: "secret_hash",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_created_until_cutoff() {
        let store = setup_store().await;
        let old = session("old", 1_000);
        let boundary = session("boundary", 2_000);
        let fresh = session("fresh", 3_000);
        for stored in [&old, &boundary, &fresh] {
            store.insert(stored).await.unwrap();
        }

        let cutoff = boundary.created_at;
        assert_eq!(store.delete_created_until(cutoff).await.unwrap(), 2);

        assert_eq!(store.fetch_by_id(&old.id).await.unwrap(), None);
        assert_eq!(store.fetch_by_id(&boundary.id).await.unwrap(), None);
        assert_eq!(store.fetch_by_id(&fresh.id).await.unwrap(), Some(fresh.clone()));

        let later = fresh.created_at + TimeDelta::seconds(-1);
        assert_eq!(store.delete_created_until(later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn closed_pool_is_unavailable() {
        let store = setup_store().await;
        store.db().close().await;

        let err = store
            .fetch_by_id(&SessionId::from("session1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
