//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → threaded explicitly into resolver, verifier and sessions at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; lifetime is process start to shutdown
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, Environment, GateConfig, ListenerConfig, ObservabilityConfig, TenancyConfig,
    UpstreamConfig, UserRecord,
};
pub use validation::ValidationError;
