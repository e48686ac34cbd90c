//! Identity-validating reverse proxy for internal service traffic.
//!
//! Every inbound call is attributed to a caller, checked against the
//! trusted-service registry, classified as REST, GraphQL or SOAP,
//! forwarded to a single backend and recorded in an in-memory audit trail.

pub mod admin;
pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::schema::MiddlewareConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
