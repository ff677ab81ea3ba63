//! Gate middleware.
//! Applies the routing decision to every in-scope request.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::authenticate;
use crate::http::request::with_path;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{Evaluation, GateRequest, RoutingDecision};

pub async fn gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Out-of-scope paths (API, internals, static files) pass untouched.
    if !state.router.is_gated(request.uri().path()) {
        return next.run(request).await;
    }

    // 2. Resolve auth; token failures are simply anonymous.
    let (parts, body) = request.into_parts();
    let gate_request = GateRequest::from_parts(&parts);
    let auth = authenticate(&parts.headers, state.cookie_name(), state.tokens.as_ref());

    // 3. Decide.
    let Evaluation { tenant, decision } = state.router.evaluate(&gate_request, &auth);
    metrics::record_decision(tenant.as_str(), decision.outcome());
    tracing::debug!(
        tenant = %tenant,
        host = %gate_request.host,
        path = %gate_request.path,
        authenticated = auth.authenticated,
        role = ?auth.role,
        outcome = decision.outcome(),
        "Gate decision"
    );

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(tenant);
    request.extensions_mut().insert(auth);

    // 4. Apply.
    match decision {
        RoutingDecision::Continue => next.run(request).await,
        RoutingDecision::Rewrite(path) => match with_path(request.uri(), &path) {
            Ok(uri) => {
                *request.uri_mut() = uri;
                next.run(request).await
            }
            Err(e) => {
                tracing::error!(error = %e, target = %path, "Failed to rewrite request path");
                ApiError::internal("Failed to rewrite request").into_response()
            }
        },
        RoutingDecision::Redirect(location) => Redirect::temporary(&location).into_response(),
    }
}
