//! Backend mediation subsystem.
//!
//! # Data Flow
//! ```text
//! Identified, validated request
//!     → protocol.rs (REST / GraphQL / SOAP label)
//!     → forwarder.rs (outbound call, header injection, timing)
//!     → audit log (one entry per attempt)
//!     → raw backend payload back to the gateway
//! ```

pub mod forwarder;
pub mod protocol;

pub use forwarder::{
    BackendTarget, ForwardError, ForwardedResponse, OutboundRequest, ProxyForwarder,
};
pub use protocol::{classify, ProtocolType};
