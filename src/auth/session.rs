//! Session token issuing, validation and cookie transport.
//!
//! # Token format
//! ```text
//! base64url(json claims) "." base64url(HMAC-SHA256(session_secret, payload))
//! ```
//!
//! # Design Decisions
//! - Validation never errors: anything that does not verify is "no session"
//! - Signature is checked before the payload is parsed
//! - Cookie is looked up first, then `Authorization: Bearer`

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use time::Duration as TimeDuration;

use crate::auth::credentials::VerifiedIdentity;
use crate::auth::role::{AuthState, Role};
use crate::config::{AuthConfig, Environment};

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to encode session claims: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Issues and validates signed session tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, identity: &VerifiedIdentity) -> Result<String, SessionError>;

    /// `None` for malformed, forged or expired tokens.
    fn validate(&self, token: &str) -> Option<SessionClaims>;
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// HMAC-SHA256 signed tokens with a fixed lifetime.
#[derive(Clone)]
pub struct HmacTokenIssuer {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl HmacTokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    pub fn issue_at(&self, identity: &VerifiedIdentity, now: u64) -> Result<String, SessionError> {
        let claims = SessionClaims {
            sub: identity.id.to_string(),
            role: Some(identity.role),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        Ok(self.sign(&claims)?)
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String, serde_json::Error> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    pub fn validate_at(&self, token: &str, now: u64) -> Option<SessionClaims> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let raw = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: SessionClaims = serde_json::from_slice(&raw).ok()?;
        if claims.exp <= now {
            return None;
        }
        Some(claims)
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, identity: &VerifiedIdentity) -> Result<String, SessionError> {
        self.issue_at(identity, unix_now())
    }

    fn validate(&self, token: &str) -> Option<SessionClaims> {
        self.validate_at(token, unix_now())
    }
}

/// Name of the session cookie for the given environment.
pub fn session_cookie_name(environment: Environment) -> &'static str {
    if environment.is_production() {
        "__Secure-gate.session-token"
    } else {
        "gate.session-token"
    }
}

fn build_cookie(value: String, max_age: TimeDuration, environment: Environment, auth: &AuthConfig) -> Cookie<'static> {
    let mut builder = Cookie::build((session_cookie_name(environment), value))
        .path("/")
        .http_only(true)
        .secure(environment.is_production())
        .same_site(SameSite::Lax)
        .max_age(max_age);
    if let Some(domain) = &auth.cookie_domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Cookie carrying a freshly issued token.
pub fn session_cookie(token: String, environment: Environment, auth: &AuthConfig) -> Cookie<'static> {
    let ttl = i64::try_from(auth.session_ttl_secs).unwrap_or(i64::MAX);
    build_cookie(token, TimeDuration::seconds(ttl), environment, auth)
}

/// Cookie that instructs the browser to drop the session.
pub fn removal_cookie(environment: Environment, auth: &AuthConfig) -> Cookie<'static> {
    build_cookie(String::new(), TimeDuration::ZERO, environment, auth)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's authentication from request headers.
pub fn authenticate(headers: &HeaderMap, cookie_name: &str, issuer: &dyn TokenIssuer) -> AuthState {
    let jar = CookieJar::from_headers(headers);
    let token = jar
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(headers).map(str::to_string));

    match token.and_then(|t| issuer.validate(&t)) {
        Some(claims) => AuthState::signed_in(claims.role),
        None => AuthState::anonymous(),
    }
}
