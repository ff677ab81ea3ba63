//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, gate)
//! - Serve sign-in, sign-out and session endpoints
//! - Forward gated requests to the upstream page backend
//! - Graceful shutdown on the lifecycle broadcast

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{
    CredentialVerifier, HmacTokenIssuer, InMemoryCredentialStore, PasswordHasher, StoredCredential,
    TokenIssuer,
};
use crate::auth::session::session_cookie_name;
use crate::config::{AuthConfig, Environment, GateConfig};
use crate::http::handlers;
use crate::http::middleware::gate_middleware;
use crate::http::request::{make_request_span, request_id, tenant_header, upstream_uri, X_GATE_TENANT};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::routing::{GateRequest, GateRouter, Tenant};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<GateRouter>,
    pub verifier: Arc<CredentialVerifier>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<str>,
    pub environment: Environment,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    /// Build every collaborator from the validated configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        let store = InMemoryCredentialStore::new(
            config.users.iter().cloned().map(StoredCredential::from),
        );
        if store.is_empty() {
            tracing::warn!("No users configured, every sign-in will be rejected");
        } else {
            tracing::info!(users = store.len(), "Credential store loaded");
        }
        let verifier = CredentialVerifier::new(
            Arc::new(store),
            PasswordHasher::new(&config.auth.password_secret),
        );
        let tokens = HmacTokenIssuer::new(&config.auth.session_secret, config.auth.session_ttl_secs);

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            router: Arc::new(GateRouter::new(&config.tenancy.root_domain)),
            verifier: Arc::new(verifier),
            tokens: Arc::new(tokens),
            client,
            upstream: Arc::from(config.upstream.address.as_str()),
            environment: config.tenancy.environment,
            auth: Arc::new(config.auth.clone()),
        }
    }

    pub fn cookie_name(&self) -> &'static str {
        session_cookie_name(self.environment)
    }
}

/// HTTP server for the gate.
pub struct GateServer {
    router: Router,
    config: GateConfig,
}

impl GateServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        let state = AppState::from_config(&config);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &GateConfig, state: AppState) -> Router {
        let gated = Router::new()
            .fallback(proxy_handler)
            .layer(middleware::from_fn_with_state(state.clone(), gate_middleware))
            .with_state(state.clone());

        Router::new()
            .route("/healthz", get(handlers::healthz))
            .route("/api/auth/sign-in", post(handlers::sign_in))
            .route("/api/auth/sign-out", post(handlers::sign_out))
            .route("/api/auth/session", get(handlers::session))
            .with_state(state)
            .fallback_service(gated)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            root_domain = %self.config.tenancy.root_domain,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward the (possibly rewritten) request to the page backend.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();

    let (mut parts, body) = request.into_parts();
    let tenant = match parts.extensions.get::<Tenant>() {
        Some(tenant) => *tenant,
        None => state.router.resolve_tenant(&GateRequest::from_parts(&parts)),
    };

    parts.uri = match upstream_uri(&parts.uri, &state.upstream) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Invalid upstream URI");
            return ApiError::internal("Invalid upstream URI").into_response();
        }
    };
    parts.headers.insert(X_GATE_TENANT, tenant_header(tenant));

    tracing::debug!(
        request_id = %request_id,
        tenant = %tenant,
        uri = %parts.uri,
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16(), start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(502, start);
            ApiError::bad_gateway("Upstream request failed").into_response()
        }
    }
}
