//! Bearer token composition and generation
//!
//! A bearer token has a structure of `{id}.{secret}`. The `id` part is an identifier unique for
//! the store, that serves as the lookup key and is not considered secret. The `secret` part is
//! what authenticates the bearer - it is never stored, only its digest is (see [`crate::hasher`]).
//!
//! Both parts are generated by [`generate`] from 24 random bytes. Every byte is mapped to a
//! human-safe alphabet by its top 5 bits, so each part is 24 characters long and carries 120 bits
//! of entropy.

use derivative::Derivative;
use thiserror::Error;

use crate::session::SessionId;

/// Separates `id` and `secret` in a bearer token
pub const DELIMITER: char = '.';

/// Lowercase letters and digits without `l`, `o`, `0` and `1`
pub const ALPHABET: &[u8; 32] = b"abcdefghijkmnpqrstuvwxyz23456789";

/// Number of random bytes drawn for every generated string
pub const RANDOM_BYTES: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Malformed session token")]
pub struct MalformedToken;

/// Generates a random string over [`ALPHABET`]
pub fn generate() -> String {
    let bytes: [u8; RANDOM_BYTES] = rand::random();
    bytes
        .iter()
        .map(|byte| ALPHABET[usize::from(byte >> 3)] as char)
        .collect()
}

/// Composes a bearer token from its parts
pub fn encode(id: &str, secret: &str) -> String {
    format!("{id}{DELIMITER}{secret}")
}

/// Splits a bearer token into `(id, secret)`
///
/// The token has to contain exactly one delimiter, with non-empty parts on both sides of it.
pub fn decode(token: &str) -> Result<(&str, &str), MalformedToken> {
    let (id, secret) = token.split_once(DELIMITER).ok_or(MalformedToken)?;

    if id.is_empty() || secret.is_empty() || secret.contains(DELIMITER) {
        return Err(MalformedToken);
    }

    Ok((id, secret))
}

/// Bearer token handed out to the caller
///
/// Exists only in transit. Its `Debug` output omits the secret; the full token is rendered only
/// through [`SessionToken::expose`].
#[derive(Clone, PartialEq, Eq, Derivative)]
#[derivative(Debug)]
pub struct SessionToken {
    /// Public part of the token
    id: SessionId,
    #[derivative(Debug = "ignore")]
    secret: String,
}

impl SessionToken {
    pub(crate) fn new(id: SessionId, secret: String) -> Self {
        Self { id, secret }
    }

    /// Id of the session this token authenticates
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Renders the token for the `Authorization` header or a cookie
    pub fn expose(&self) -> String {
        encode(self.id.as_str(), &self.secret)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_strings_use_alphabet() {
        for _ in 0..100 {
            let value = generate();
            assert_eq!(value.len(), RANDOM_BYTES);
            assert!(value.bytes().all(|c| ALPHABET.contains(&c)));
            assert!(!value.contains(DELIMITER));
        }
    }

    #[test]
    fn alphabet_excludes_ambiguous_characters() {
        assert_eq!(ALPHABET.len(), 32);
        for c in [b'l', b'o', b'0', b'1', DELIMITER as u8] {
            assert!(!ALPHABET.contains(&c));
        }
    }

    #[test]
    fn generated_ids_are_distinct() {
        let ids: HashSet<_> = (0..1000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn decode_generated_token() {
        let id = generate();
        let secret = generate();
        let token = encode(&id, &secret);

        assert_eq!(decode(&token), Ok((id.as_str(), secret.as_str())));
    }

    #[test]
    fn decode_minimal_token() {
        assert_eq!(decode("a.b"), Ok(("a", "b")));
    }

    #[test]
    fn decode_malformed_tokens() {
        for token in ["", "abc", ".", "a.", ".b", "a.b.c", "a..b", "..", "a.b."] {
            assert_eq!(decode(token), Err(MalformedToken), "token: {token:?}");
        }
    }

    #[test]
    fn token_debug_hides_secret() {
        let token = SessionToken::new(SessionId::from("public"), "hidden".to_owned());

        let debug = format!("{token:?}");
        assert!(debug.contains("public"));
        assert!(!debug.contains("hidden"));

        assert_eq!(token.expose(), "public.hidden");
    }
}
