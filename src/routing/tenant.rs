//! Tenant resolution from the request host.
//!
//! # Design Decisions
//! - Pure function of (host, full URL, local flag) plus the root domain
//!   fixed at construction
//! - Port never affects classification
//! - Local development accepts any `interviewer.*` host so that
//!   `interviewer.localhost:3000` works without DNS setup

use std::fmt;

use serde::Serialize;

use crate::routing::request::split_host_port;

/// Audience segment selected by subdomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenant {
    Root,
    Interviewer,
}

impl Tenant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tenant::Root => "root",
            Tenant::Interviewer => "interviewer",
        }
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const INTERVIEWER_PREFIX: &str = "interviewer.";
const LOCAL_INTERVIEWER_URL: &str = "http://interviewer.localhost";

/// True when the URL points at a loopback development host.
pub fn is_local_url(full_url: &str) -> bool {
    full_url.contains("localhost") || full_url.contains("127.0.0.1")
}

/// Classifies hosts into tenants relative to the configured root domain.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    root_domain_host: String,
}

impl TenantResolver {
    /// `root_domain` is `host[:port]`; the port is dropped.
    pub fn new(root_domain: &str) -> Self {
        Self {
            root_domain_host: split_host_port(root_domain).0.to_ascii_lowercase(),
        }
    }

    pub fn resolve(&self, host: &str, full_url: &str, is_local: bool) -> Tenant {
        let hostname = split_host_port(host).0;

        let interviewer = if is_local {
            hostname.starts_with(INTERVIEWER_PREFIX) || full_url.contains(LOCAL_INTERVIEWER_URL)
        } else {
            hostname
                .strip_prefix(INTERVIEWER_PREFIX)
                .is_some_and(|rest| rest == self.root_domain_host)
        };

        if interviewer {
            Tenant::Interviewer
        } else {
            Tenant::Root
        }
    }
}
