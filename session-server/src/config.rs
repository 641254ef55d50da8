//! Service configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use session_core::Policy;
use tracing_subscriber::filter::Directive;

/// Logging output format
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Sessions database configuration
///
/// The sessions table is created on startup if it doesn't exist.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum Database {
    /// In-memory SQLite database, sessions are lost on restart
    Memory {
        #[serde(default = "Database::default_max_connections")]
        max_connections: u32,
    },
    /// File based SQLite database
    SqLite {
        path: PathBuf,
        #[serde(default = "Database::default_max_connections")]
        max_connections: u32,
    },
}

impl Database {
    fn default_max_connections() -> u32 {
        4
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::Memory { max_connections: 1 }
    }
}

/// Session policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Sessions {
    /// Session lifetime, configured in seconds as `ttl_seconds`
    #[serde(
        rename = "ttl_seconds",
        default,
        deserialize_with = "Sessions::deserialize_policy"
    )]
    pub policy: Policy,

    /// How often expired sessions are swept from the database, `0` disables the sweep
    #[serde(default = "Sessions::default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

impl Sessions {
    fn deserialize_policy<'de, D>(deserializer: D) -> Result<Policy, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ttl_seconds: i64 = Deserialize::deserialize(deserializer)?;
        Policy::with_ttl_seconds(ttl_seconds).map_err(serde::de::Error::custom)
    }

    fn default_cleanup_interval_seconds() -> u64 {
        60
    }
}

impl Default for Sessions {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            cleanup_interval_seconds: Self::default_cleanup_interval_seconds(),
        }
    }
}

/// Top level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address where to host the service
    #[serde(default = "Config::default_host")]
    pub host: SocketAddr,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,

    /// Database configuration
    #[serde(default)]
    pub db: Database,

    /// Session policy
    #[serde(default)]
    pub sessions: Sessions,
}

impl Config {
    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 3030).into()
    }
}
