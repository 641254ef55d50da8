//! Secret hashing

use sha2::{Digest, Sha256};

/// Length of the secret digest in bytes
pub const DIGEST_LEN: usize = 32;

/// Digest of a session secret
///
/// This is the only form of the secret that ever reaches the store.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretHash([u8; DIGEST_LEN]);

impl SecretHash {
    /// Rebuilds the digest from stored bytes
    ///
    /// Returns `None` if the slice is not exactly [`DIGEST_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretHash(..)")
    }
}

/// Hashes the secret
pub fn hash(secret: &[u8]) -> SecretHash {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    SecretHash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let secret = b"abcdefghijkmnpqrstuvwxyz";
        assert_eq!(hash(secret), hash(secret));
        assert_eq!(hash(secret).as_bytes().len(), DIGEST_LEN);
    }

    #[test]
    fn sha256_known_answers() {
        assert_eq!(
            hex::encode(hash(b"").as_bytes()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(hash(b"abc").as_bytes()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn empty_secret_is_hashed() {
        let empty = hash(b"");
        assert_eq!(empty.as_bytes().len(), DIGEST_LEN);
        assert_ne!(empty, hash(b"a"));
    }

    #[test]
    fn from_slice_rejects_other_lengths() {
        let digest = hash(b"secret");
        assert_eq!(SecretHash::from_slice(digest.as_bytes()), Some(digest));
        assert_eq!(SecretHash::from_slice(&[0; 31]), None);
        assert_eq!(SecretHash::from_slice(&[0; 33]), None);
        assert_eq!(SecretHash::from_slice(&[]), None);
    }

    #[test]
    fn debug_hides_digest() {
        assert_eq!(format!("{:?}", hash(b"secret")), "SecretHash(..)");
    }
}
