//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, headers)
//!     → matcher.rs (is the path in gate scope?)
//!     → request.rs (GateRequest: host, path, scheme, port, URL)
//!     → tenant.rs (host → Root | Interviewer)
//!     → decision.rs (tenant + AuthState → Continue | Rewrite | Redirect)
//!     → router.rs ties the steps together
//! ```
//!
//! # Design Decisions
//! - Everything here is pure; no I/O, no shared mutable state
//! - Deterministic: same input always yields the same decision
//! - The branch table is total: every request reaches exactly one decision

pub mod decision;
pub mod matcher;
pub mod request;
pub mod router;
pub mod tenant;

pub use decision::{DecisionEngine, RoutingDecision};
pub use matcher::GateScope;
pub use request::GateRequest;
pub use router::{Evaluation, GateRouter};
pub use tenant::{is_local_url, Tenant, TenantResolver};
