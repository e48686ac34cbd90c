//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MiddlewareConfig (validated, immutable)
//!     → consumed once at startup to build the shared components
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the trusted set is fixed for the
//!   lifetime of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, AuditConfig, BackendConfig, ListenerConfig, LogFormat, MiddlewareConfig,
    ObservabilityConfig, TlsConfig, TrustConfig,
};
