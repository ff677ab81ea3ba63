//! Credential lookup and verification.
//!
//! # Responsibilities
//! - Look up one stored row by email or username
//! - Verify the supplied password against the stored keyed hash
//! - Collapse every failure into the same `None` outcome
//!
//! # Design Decisions
//! - The store is a trait; the shipped store is an immutable in-memory index
//! - Unknown identifier, wrong password and store faults are indistinguishable
//!   to the caller, so sign-in cannot be used to enumerate identifiers

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::password::PasswordHasher;
use crate::auth::role::Role;

/// A credential row owned by the store. Read-only from the gate's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Identity returned after a successful password check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl From<&StoredCredential> for VerifiedIdentity {
    fn from(row: &StoredCredential) -> Self {
        Self {
            id: row.id,
            email: row.email.clone(),
            username: row.username.clone(),
            role: row.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Source of stored credential rows.
///
/// Email and username are each unique, so at most one row matches an
/// identifier.
pub trait CredentialStore: Send + Sync {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<StoredCredential>, StoreError>;
}

/// Immutable store indexed by both email and username.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    rows: Vec<StoredCredential>,
    by_identifier: HashMap<String, usize>,
}

impl InMemoryCredentialStore {
    pub fn new(rows: impl IntoIterator<Item = StoredCredential>) -> Self {
        let rows: Vec<StoredCredential> = rows.into_iter().collect();
        let mut by_identifier = HashMap::with_capacity(rows.len() * 2);
        for (i, row) in rows.iter().enumerate() {
            by_identifier.entry(row.email.clone()).or_insert(i);
            by_identifier.entry(row.username.clone()).or_insert(i);
        }
        Self { rows, by_identifier }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<StoredCredential>, StoreError> {
        Ok(self
            .by_identifier
            .get(identifier)
            .map(|&i| self.rows[i].clone()))
    }
}

/// Well-formed hash compared against when no row matches.
const UNKNOWN_IDENTIFIER_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Maps `(identifier, password)` to a verified identity.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Returns the identity only when a row exists for `identifier` and the
    /// keyed hash of `password` equals its stored hash.
    pub fn verify(&self, identifier: &str, password: &str) -> Option<VerifiedIdentity> {
        if identifier.is_empty() || password.is_empty() {
            return None;
        }

        let row = match self.store.find_by_identifier(identifier) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(error = %e, "Credential lookup failed");
                None
            }
        };

        // Unknown identifiers still pay for one keyed hash.
        let stored = row
            .as_ref()
            .map_or(UNKNOWN_IDENTIFIER_HASH, |r| r.password_hash.as_str());
        let matched = self.hasher.verify(password, stored);

        row.filter(|_| matched).map(|r| VerifiedIdentity::from(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn row(id: i64, email: &str, username: &str, password: &str, role: Role) -> StoredCredential {
        StoredCredential {
            id,
            email: email.into(),
            username: username.into(),
            password_hash: PasswordHasher::new(SECRET).hash(password),
            role,
        }
    }

    fn verifier() -> CredentialVerifier {
        let store = InMemoryCredentialStore::new(vec![
            row(1, "ada@example.com", "ada", "analytical", Role::Interviewer),
            row(2, "realuser@example.com", "realuser", "rightpassword", Role::User),
        ]);
        CredentialVerifier::new(Arc::new(store), PasswordHasher::new(SECRET))
    }

    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        fn find_by_identifier(&self, _: &str) -> Result<Option<StoredCredential>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_verify_by_email_and_username() {
        let verifier = verifier();
        let by_email = verifier.verify("ada@example.com", "analytical").unwrap();
        let by_username = verifier.verify("ada", "analytical").unwrap();
        assert_eq!(by_email, by_username);
        assert_eq!(by_email.id, 1);
        assert_eq!(by_email.role, Role::Interviewer);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(verifier().verify("ADA", "analytical").is_none());
    }

    #[test]
    fn test_verify_is_idempotent() {
        let verifier = verifier();
        let first = verifier.verify("realuser", "rightpassword");
        let second = verifier.verify("realuser", "rightpassword");
        assert!(first.is_some());
        assert_eq!(first, second);
        let hasher = PasswordHasher::new(SECRET);
        assert_eq!(hasher.hash("pw"), hasher.hash("pw"));
    }

    #[test]
    fn test_unknown_and_wrong_password_look_the_same() {
        let verifier = verifier();
        let unknown = verifier.verify("unknown@x.com", "anything");
        let wrong = verifier.verify("realuser", "wrongpassword");
        assert_eq!(unknown, None);
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn test_unknown_identifier_hash_is_well_formed() {
        // Must pass the hex format check so the keyed hash is computed.
        assert_eq!(UNKNOWN_IDENTIFIER_HASH.len(), 64);
        assert!(UNKNOWN_IDENTIFIER_HASH
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
        assert_eq!(hex::decode(UNKNOWN_IDENTIFIER_HASH).unwrap().len(), 32);

        let verifier = verifier();
        for password in ["", "anything", "analytical", "rightpassword"] {
            assert!(verifier.verify("nobody@example.com", password).is_none());
        }
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let verifier = verifier();
        assert!(verifier.verify("", "analytical").is_none());
        assert!(verifier.verify("ada", "").is_none());
    }

    #[test]
    fn test_store_failure_is_not_found() {
        let verifier = CredentialVerifier::new(Arc::new(BrokenStore), PasswordHasher::new(SECRET));
        assert!(verifier.verify("ada", "analytical").is_none());
    }

    #[test]
    fn test_other_secret_does_not_verify() {
        let store = InMemoryCredentialStore::new(vec![row(1, "a@x.com", "a", "pw", Role::User)]);
        let verifier = CredentialVerifier::new(Arc::new(store), PasswordHasher::new("other"));
        assert!(verifier.verify("a", "pw").is_none());
    }
}
