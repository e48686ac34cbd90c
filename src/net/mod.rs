//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional TLS handshake, client certificate verification)
//!     → PeerCertificate extension on every request of the connection
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; plain listeners rely on the declared-identity header
//! - Only verified certificates ever reach the identity extractor

pub mod tls;
