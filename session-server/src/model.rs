//! Service global context

use std::path::PathBuf;

use color_eyre::Result;
use session_core::{SessionService, SqliteStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

use crate::config;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid SQLite path: {path}")]
    InvalidSQLitePath { path: PathBuf },
}

/// Sessions backed by the SQLite store
pub type Sessions = SessionService<SqliteStore>;

/// Context shared by all the handlers
#[derive(Debug, Clone)]
pub struct Model {
    /// Sessions management
    sessions: Sessions,
}

impl Model {
    /// Context for testing purposes - using the in-memory SQLite database
    #[cfg(test)]
    pub async fn test() -> Result<Self> {
        Self::with_config(
            config::Database::Memory { max_connections: 1 },
            config::Sessions::default(),
        )
        .await
    }

    /// Context from configuration
    ///
    /// The sessions table is created if it is not there yet.
    pub async fn with_config(db: config::Database, sessions: config::Sessions) -> Result<Self> {
        use config::Database::*;

        let pool = match db {
            Memory { max_connections } => {
                let opts = SqliteConnectOptions::new()
                    .filename(":memory:")
                    .create_if_missing(true)
                    .shared_cache(true);

                // In-memory database lives as long as its connections
                SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(opts)
                    .await?
            }

            SqLite {
                path,
                max_connections,
            } => {
                let path = path
                    .as_path()
                    .to_str()
                    .ok_or_else(|| Error::InvalidSQLitePath { path: path.clone() })?;

                let opts = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);

                SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(opts)
                    .await?
            }
        };

        let store = SqliteStore::new(pool).await?;
        let sessions = SessionService::new(store).with_policy(sessions.policy);

        Ok(Self { sessions })
    }

    /// Access to the sessions
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// Accesses the DB pool
    #[cfg(test)]
    pub fn db(&self) -> &sqlx::SqlitePool {
        self.sessions.store().db()
    }
}
