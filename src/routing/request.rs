//! The routing-relevant view of an inbound request.

use axum::http::{header, request::Parts};
use serde::Serialize;
use url::Url;

/// Header set by TLS-terminating load balancers.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Immutable input to the gate: host, path, scheme, port and the full URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateRequest {
    /// Host as sent by the client, lowercased, port included.
    pub host: String,
    pub path: String,
    /// `http` or `https`, without the trailing colon.
    pub scheme: String,
    pub port: Option<u16>,
    pub raw_url: String,
}

/// Split `host[:port]`, keeping bracketed IPv6 literals intact.
pub fn split_host_port(host: &str) -> (&str, Option<u16>) {
    let (name, port) = if host.starts_with('[') {
        match host.find("]:") {
            Some(i) => (&host[..=i], Some(&host[i + 2..])),
            None => (host, None),
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) => (name, Some(port)),
            None => (host, None),
        }
    };

    match port.map(str::parse::<u16>) {
        Some(Ok(port)) => (name, Some(port)),
        Some(Err(_)) => (name, None),
        None => (name, None),
    }
}

/// `http` or `https`; anything else falls back to `http`.
///
/// The scheme ends up in redirect `Location` headers, so arbitrary header
/// text must never pass through.
fn normalize_scheme(scheme: &str) -> &'static str {
    let scheme = scheme.trim().trim_end_matches(':');
    if scheme.eq_ignore_ascii_case("https") {
        "https"
    } else {
        "http"
    }
}

impl GateRequest {
    pub fn new(scheme: &str, host: &str, path: &str) -> Self {
        let host = host.to_ascii_lowercase();
        let scheme = normalize_scheme(scheme).to_string();
        let path = if path.is_empty() { "/".to_string() } else { path.to_string() };
        let port = split_host_port(&host).1;
        let raw_url = format!("{scheme}://{host}{path}");
        Self {
            host,
            path,
            scheme,
            port,
            raw_url,
        }
    }

    /// Build from request parts.
    ///
    /// Scheme comes from `X-Forwarded-Proto`, then the URI, then `http`.
    /// Host comes from the `Host` header, then the URI authority.
    pub fn from_parts(parts: &Parts) -> Self {
        let scheme = parts
            .headers
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| parts.uri.scheme_str())
            .unwrap_or("http");

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or_default();

        Self::new(scheme, host, parts.uri.path())
    }

    /// Build from an absolute URL.
    pub fn from_url(url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => String::new(),
        };
        Self::new(url.scheme(), &host, url.path())
    }

    /// `scheme://host[:port]` of this request.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}
