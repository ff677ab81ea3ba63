//! HTTP surface of the gate.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → handlers.rs (/healthz, /api/auth/*), served directly
//!     → middleware/gate.rs (tenant, auth, decision) for everything else
//!     → server.rs proxy (forward to the page backend with x-gate-tenant)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{X_GATE_TENANT, X_REQUEST_ID};
pub use server::{AppState, GateServer};
