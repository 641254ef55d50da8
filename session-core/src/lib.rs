//! Session token authentication core
//!
//! Issues opaque `{id}.{secret}` bearer tokens for already authenticated users and validates them
//! on every subsequent request. Only a digest of the secret half is ever persisted, so a read-only
//! leak of the store does not yield usable tokens.
//!
//! The building blocks are composed by [`SessionService`]:
//! - [`hasher`] maps secrets to fixed-length digests
//! - [`token`] generates, composes and splits bearer tokens
//! - [`compare`] compares digests in constant time
//! - [`store`] persists sessions ([`SqliteStore`], [`MemoryStore`])

pub mod clock;
pub mod compare;
pub mod hasher;
pub mod service;
pub mod session;
pub mod store;
#[cfg(test)]
pub mod testutil;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use service::{Category, Error, InvalidTtl, Policy, Rejection, SessionService};
pub use session::{Session, SessionId, SessionView};
pub use store::{MemoryStore, SessionStore, SqliteStore, StoreError};
pub use token::SessionToken;
