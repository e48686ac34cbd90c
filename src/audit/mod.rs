//! Audit trail subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarder completion / failure, admission refusal
//!     → entry.rs (immutable AuditEntry)
//!     → log.rs (append, structured log event, size gauge)
//!     → admin surface reads the most recent N entries
//! ```

pub mod entry;
pub mod log;

pub use self::entry::{AuditEntry, AuditResult, RequestSummary};
pub use self::log::AuditLog;
