//! Endpoints served by the gate itself.
//!
//! These live under `/api`, outside the gate's scope, and are never proxied.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::auth::session::{removal_cookie, session_cookie};
use crate::auth::{authenticate, AuthState, VerifiedIdentity};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Sign-in form. Missing fields are treated as empty and rejected.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SignInRequest>,
) -> Result<(CookieJar, Json<VerifiedIdentity>), ApiError> {
    let verifier = state.verifier.clone();
    let outcome = tokio::task::spawn_blocking(move || verifier.verify(&form.identifier, &form.password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Credential verification task failed");
            ApiError::internal("Sign-in failed")
        })?;

    let Some(identity) = outcome else {
        metrics::record_sign_in("rejected");
        tracing::info!("Sign-in rejected");
        return Err(ApiError::invalid_credentials());
    };

    let token = state.tokens.issue(&identity).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue session token");
        ApiError::internal("Sign-in failed")
    })?;

    metrics::record_sign_in("accepted");
    tracing::info!(user_id = identity.id, role = %identity.role, "Sign-in accepted");

    let jar = jar.add(session_cookie(token, state.environment, &state.auth));
    Ok((jar, Json(identity)))
}

pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(removal_cookie(state.environment, &state.auth));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthState> {
    Json(authenticate(&headers, state.cookie_name(), state.tokens.as_ref()))
}
