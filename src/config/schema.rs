//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::auth::{Role, StoredCredential};

/// Fallback secret used when no password secret is configured.
/// Rejected by validation in production.
pub const DEV_PASSWORD_SECRET: &str = "development-only-salt";

/// Fallback session signing secret, development only.
pub const DEV_SESSION_SECRET: &str = "development-only-session-secret";

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tenant resolution settings.
    pub tenancy: TenancyConfig,

    /// Credential hashing and session settings.
    pub auth: AuthConfig,

    /// Page backend that receives gated requests.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Credential rows served by the in-memory store.
    pub users: Vec<UserRecord>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Deployment environment.
///
/// Affects cookie transport only, never the routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Tenant resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Host (with optional port) of the primary tenant, e.g. "example.com".
    pub root_domain: String,

    /// Deployment environment.
    pub environment: Environment,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            root_domain: "localhost:3000".to_string(),
            environment: Environment::Development,
        }
    }
}

/// Credential and session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Key for the password HMAC.
    pub password_secret: String,

    /// Key for signing session tokens.
    pub session_secret: String,

    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,

    /// Optional cookie `Domain` attribute so sessions span subdomains.
    pub cookie_domain: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_secret: DEV_PASSWORD_SECRET.to_string(),
            session_secret: DEV_SESSION_SECRET.to_string(),
            session_ttl_secs: 30 * 24 * 60 * 60, // 30 days
            cookie_domain: None,
        }
    }
}

/// Upstream page backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A stored credential row as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Hex HMAC of the password, see `gate-cli hash-password`.
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

impl From<UserRecord> for StoredCredential {
    fn from(record: UserRecord) -> Self {
        StoredCredential {
            id: record.id,
            email: record.email,
            username: record.username,
            password_hash: record.password_hash,
            role: record.role,
        }
    }
}
