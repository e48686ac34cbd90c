//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → gateway.rs (identify → validate → classify → forward)
//!     → request.rs (request ID, headers, path normalization)
//!     → response.rs (backend body + provenance headers, JSON errors)
//!     → Send to client
//! ```

pub mod gateway;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{SERVICE_NAME, X_CLIENT_VALIDATED, X_PROXIED_BY};
pub use server::{AppState, HttpServer, ServerError};
