//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Sign-in (explicit action):
//!     (identifier, password)
//!     → credentials.rs (store lookup by email or username)
//!     → password.rs (keyed hash, constant-time compare)
//!     → VerifiedIdentity
//!     → session.rs (issue signed token, set cookie)
//!
//! Every gated request:
//!     cookie / bearer header
//!     → session.rs (validate token)
//!     → AuthState { authenticated, role }
//! ```
//!
//! # Design Decisions
//! - Lookup failure and password mismatch collapse into one outcome
//! - Token failures degrade to anonymous, never to an error
//! - Role is a closed enum so routing branches are checked exhaustively

pub mod credentials;
pub mod password;
pub mod role;
pub mod session;

pub use credentials::{
    CredentialStore, CredentialVerifier, InMemoryCredentialStore, StoreError, StoredCredential,
    VerifiedIdentity,
};
pub use password::PasswordHasher;
pub use role::{AuthState, Role};
pub use session::{authenticate, HmacTokenIssuer, SessionClaims, SessionError, TokenIssuer};
