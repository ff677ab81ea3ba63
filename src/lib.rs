//! Tenant-aware routing gate.
//!
//! Sits in front of a page backend, decides per request whether to pass,
//! rewrite into the interviewer area, or redirect, and owns sign-in.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GateConfig;
pub use http::GateServer;
pub use lifecycle::Shutdown;
