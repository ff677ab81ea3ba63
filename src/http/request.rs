//! Request identification and rewriting helpers.
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Rewrites replace the path and keep the query string

use axum::body::Body;
use axum::http::{uri::PathAndQuery, HeaderValue, Request, Uri};
use tracing::Span;

use crate::routing::Tenant;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Header telling the page backend which tenant the gate resolved.
pub const X_GATE_TENANT: &str = "x-gate-tenant";

pub fn request_id(request: &Request<Body>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for the trace layer, carrying the request ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Replace the path of `uri`, keeping scheme, authority and query.
pub fn with_path(uri: &Uri, path: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>()?);
    Ok(Uri::from_parts(parts)?)
}

/// Absolute URI for forwarding `uri` to `upstream` (`host:port`).
pub fn upstream_uri(uri: &Uri, upstream: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Ok(format!("http://{upstream}{path_and_query}").parse::<Uri>()?)
}

pub fn tenant_header(tenant: Tenant) -> HeaderValue {
    HeaderValue::from_static(tenant.as_str())
}
