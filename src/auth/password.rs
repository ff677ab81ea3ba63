//! Keyed password hashing.
//!
//! `hash(plain) = hex(HMAC-SHA256(secret, plain))`. The output is stable for
//! a given secret so stored hashes can be re-verified and re-hashed by tooling.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 password hasher seeded with the configured secret.
#[derive(Clone)]
pub struct PasswordHasher {
    secret: Vec<u8>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Lowercase hex digest, 64 characters.
    pub fn hash(&self, plain: &str) -> String {
        let mut mac = self.mac();
        mac.update(plain.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Compare `plain` against a stored hex hash in constant time.
    ///
    /// Only the exact lowercase rendering produced by [`PasswordHasher::hash`]
    /// can match; anything else is a mismatch.
    pub fn verify(&self, plain: &str, stored_hex: &str) -> bool {
        if !stored_hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return false;
        }
        let Ok(expected) = hex::decode(stored_hex) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(plain.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}
