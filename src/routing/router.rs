//! Gate evaluation pipeline.
//!
//! # Responsibilities
//! - Hold the compiled scope, tenant resolver and decision engine
//! - Run tenant resolution then the decision engine for one request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Session lookup happens outside; the router only sees `AuthState`

use serde::Serialize;

use crate::auth::AuthState;
use crate::routing::decision::{DecisionEngine, RoutingDecision};
use crate::routing::matcher::GateScope;
use crate::routing::request::GateRequest;
use crate::routing::tenant::{is_local_url, Tenant, TenantResolver};

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub tenant: Tenant,
    pub decision: RoutingDecision,
}

#[derive(Debug)]
pub struct GateRouter {
    scope: GateScope,
    resolver: TenantResolver,
    engine: DecisionEngine,
}

impl GateRouter {
    pub fn new(root_domain: &str) -> Self {
        Self {
            scope: GateScope::default(),
            resolver: TenantResolver::new(root_domain),
            engine: DecisionEngine::new(root_domain),
        }
    }

    /// Whether the gate applies to this path at all.
    pub fn is_gated(&self, path: &str) -> bool {
        self.scope.is_gated(path)
    }

    pub fn resolve_tenant(&self, request: &GateRequest) -> Tenant {
        self.resolver
            .resolve(&request.host, &request.raw_url, is_local_url(&request.raw_url))
    }

    pub fn evaluate(&self, request: &GateRequest, auth: &AuthState) -> Evaluation {
        let tenant = self.resolve_tenant(request);
        let decision = self.engine.decide(request, tenant, auth);
        Evaluation { tenant, decision }
    }
}
