//! Routing decision engine.
//!
//! Evaluated on every gated request after tenant resolution and session
//! lookup. Branch order is a precedence and must not be rearranged:
//!
//! ```text
//! interviewer tenant:
//!     auth gate (→ root-origin /sign-in)
//!     → sign-in loop exception (continue)
//!     → role demotion (→ current-origin /)
//!     → path rewrite into /interviewer
//! root tenant:
//!     landing gate (/ → /app when signed in)
//!     → app gate (/app* → / when anonymous)
//!     → continue
//! ```
//!
//! The unauthenticated redirect targets the root origin while the role
//! demotion stays on the current host. Both are intentional.

use serde::Serialize;

use crate::auth::AuthState;
use crate::routing::request::{split_host_port, GateRequest};
use crate::routing::tenant::Tenant;

const INTERVIEWER_HOME: &str = "/interviewer";
const SIGN_IN: &str = "/sign-in";

/// What the HTTP layer should do with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum RoutingDecision {
    /// Pass through unmodified.
    Continue,
    /// Serve a different internal path; the visible URL is unchanged.
    Rewrite(String),
    /// Send the client to an absolute URL.
    Redirect(String),
}

impl RoutingDecision {
    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RoutingDecision::Continue => "continue",
            RoutingDecision::Rewrite(_) => "rewrite",
            RoutingDecision::Redirect(_) => "redirect",
        }
    }
}

/// Pure decision function parameterised by the root domain.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    root_domain_host: String,
}

impl DecisionEngine {
    /// `root_domain` is `host[:port]`; only the host is used.
    pub fn new(root_domain: &str) -> Self {
        Self {
            root_domain_host: split_host_port(root_domain).0.to_ascii_lowercase(),
        }
    }

    /// Scheme, root domain host and the request's own port.
    fn root_origin(&self, request: &GateRequest) -> String {
        match request.port {
            Some(port) => format!("{}://{}:{}", request.scheme, self.root_domain_host, port),
            None => format!("{}://{}", request.scheme, self.root_domain_host),
        }
    }

    pub fn decide(&self, request: &GateRequest, tenant: Tenant, auth: &AuthState) -> RoutingDecision {
        match tenant {
            Tenant::Interviewer => self.decide_interviewer(request, auth),
            Tenant::Root => decide_root(request, auth),
        }
    }

    fn decide_interviewer(&self, request: &GateRequest, auth: &AuthState) -> RoutingDecision {
        let path = request.path.as_str();
        let effective_path = if path == "/" { INTERVIEWER_HOME } else { path };
        let is_public = effective_path.starts_with("/interviewer/sign-in")
            || effective_path.starts_with("/interviewer/signup")
            || path == SIGN_IN;

        if !auth.authenticated && !is_public {
            return RoutingDecision::Redirect(format!("{}{}", self.root_origin(request), SIGN_IN));
        }

        if !auth.authenticated && path == SIGN_IN {
            return RoutingDecision::Continue;
        }

        if auth.authenticated && !auth.is_interviewer() && !is_public {
            return RoutingDecision::Redirect(format!("{}/", request.origin()));
        }

        if path == "/" {
            RoutingDecision::Rewrite(INTERVIEWER_HOME.to_string())
        } else if !path.starts_with(INTERVIEWER_HOME) {
            RoutingDecision::Rewrite(format!("{INTERVIEWER_HOME}{path}"))
        } else {
            RoutingDecision::Continue
        }
    }
}

fn decide_root(request: &GateRequest, auth: &AuthState) -> RoutingDecision {
    let path = request.path.as_str();

    if path == "/" {
        return if auth.authenticated {
            RoutingDecision::Redirect(format!("{}/app", request.origin()))
        } else {
            RoutingDecision::Continue
        };
    }

    if path.starts_with("/app") && !auth.authenticated {
        return RoutingDecision::Redirect(format!("{}/", request.origin()));
    }

    RoutingDecision::Continue
}
