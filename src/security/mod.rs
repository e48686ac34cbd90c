//! Caller identity and trust subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identity.rs (certificate CN → declared header → "unknown")
//!     → trust.rs (exact match against the trusted set, count on success)
//!     → admission decision (fail-open or fail-closed)
//! ```
//!
//! # Design Decisions
//! - Identity extraction is total; distrust is an outcome, not an error
//! - Trust is advisory unless `admit_on_untrusted` is disabled
//! - Only the per-identity counters mutate after startup

pub mod identity;
pub mod trust;

pub use identity::{CallerIdentity, IdentityExtractor, PeerCertificate};
pub use trust::TrustRegistry;
