//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address formats
//! - Reject development secrets in production
//! - Enforce unique email and username across credential rows
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{GateConfig, DEV_PASSWORD_SECRET, DEV_SESSION_SECRET};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let root = &config.tenancy.root_domain;
    if root.is_empty() {
        errors.push(ValidationError::new("tenancy.root_domain", "must not be empty"));
    } else if root.contains("://") || root.contains('/') {
        errors.push(ValidationError::new(
            "tenancy.root_domain",
            "must be host[:port] without scheme or path",
        ));
    }

    if config.upstream.address.is_empty() {
        errors.push(ValidationError::new("upstream.address", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    validate_auth(config, &mut errors);
    validate_users(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_auth(config: &GateConfig, errors: &mut Vec<ValidationError>) {
    let auth = &config.auth;
    if auth.password_secret.is_empty() {
        errors.push(ValidationError::new("auth.password_secret", "must not be empty"));
    }
    if auth.session_secret.is_empty() {
        errors.push(ValidationError::new("auth.session_secret", "must not be empty"));
    }
    if auth.session_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.session_ttl_secs", "must be greater than 0"));
    }

    if config.tenancy.environment.is_production() {
        if auth.password_secret == DEV_PASSWORD_SECRET {
            errors.push(ValidationError::new(
                "auth.password_secret",
                "development secret is not allowed in production",
            ));
        }
        if auth.session_secret == DEV_SESSION_SECRET {
            errors.push(ValidationError::new(
                "auth.session_secret",
                "development secret is not allowed in production",
            ));
        }
    }
}

fn validate_users(config: &GateConfig, errors: &mut Vec<ValidationError>) {
    let mut emails = HashSet::new();
    // username -> owning row
    let mut usernames = HashMap::new();
    let mut ids = HashSet::new();

    for (i, user) in config.users.iter().enumerate() {
        let field = |name: &str| format!("users[{i}].{name}");

        if !ids.insert(user.id) {
            errors.push(ValidationError::new(field("id"), format!("duplicate id {}", user.id)));
        }
        if user.email.is_empty() {
            errors.push(ValidationError::new(field("email"), "must not be empty"));
        } else if !emails.insert(user.email.as_str()) {
            errors.push(ValidationError::new(
                field("email"),
                format!("duplicate email '{}'", user.email),
            ));
        }
        if user.username.is_empty() {
            errors.push(ValidationError::new(field("username"), "must not be empty"));
        } else {
            match usernames.entry(user.username.as_str()) {
                Entry::Occupied(_) => errors.push(ValidationError::new(
                    field("username"),
                    format!("duplicate username '{}'", user.username),
                )),
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
            }
        }
        let lower_hex = user
            .password_hash
            .chars()
            .all(|c| matches!(c, '0'..='9' | 'a'..='f'));
        if user.password_hash.len() != 64 || !lower_hex {
            errors.push(ValidationError::new(
                field("password_hash"),
                "must be 64 lowercase hex characters",
            ));
        }
    }

    // An identifier matching one row's email and another row's username
    // would make lookup ambiguous.
    for (i, user) in config.users.iter().enumerate() {
        if usernames.get(user.email.as_str()).is_some_and(|&owner| owner != i) {
            errors.push(ValidationError::new(
                "users",
                format!("'{}' is used both as an email and a username", user.email),
            ));
        }
    }
}
