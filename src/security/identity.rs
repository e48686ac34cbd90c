//! Caller identity extraction.
//!
//! # Responsibilities
//! - Derive the caller identity from transport-level credentials
//! - Prefer the CN of a verified client certificate
//! - Fall back to the declared-identity header, then to `"unknown"`
//!
//! # Design Decisions
//! - Extraction never fails: a missing identity is a distrust outcome
//!   decided by the trust registry, not an error
//! - Blank values are treated as absent

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, Request};
use serde::{Deserialize, Serialize};

/// Sentinel identity for callers that present no credentials.
pub const UNKNOWN_CALLER: &str = "unknown";

/// Name of the service that issued an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The sentinel identity used when nothing identifies the caller.
    pub fn unknown() -> Self {
        Self(UNKNOWN_CALLER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CALLER
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallerIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallerIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Verified client certificate presented on the connection.
///
/// Attached to every request of an mTLS connection by the TLS acceptor.
/// `subject` is absent when the client sent no certificate.
#[derive(Debug, Clone, Default)]
pub struct PeerCertificate {
    subject: Option<Arc<str>>,
}

impl PeerCertificate {
    pub fn with_subject(subject: impl Into<Arc<str>>) -> Self {
        Self {
            subject: Some(subject.into()),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

/// Return the value of the first `CN=` attribute of a distinguished name.
///
/// ```
/// use security_middleware::security::identity::common_name;
///
/// assert_eq!(common_name("C=US, O=Shop, CN=order-bff"), Some("order-bff"));
/// assert_eq!(common_name("O=Shop"), None);
/// ```
pub fn common_name(subject: &str) -> Option<&str> {
    subject
        .split(',')
        .map(str::trim)
        .find_map(|attribute| attribute.strip_prefix("CN="))
}

/// Derive the caller identity from a certificate subject and a declared header.
pub fn extract(certificate_subject: Option<&str>, declared: Option<&str>) -> CallerIdentity {
    let from_certificate = certificate_subject
        .and_then(common_name)
        .map(str::trim)
        .filter(|cn| !cn.is_empty());

    if let Some(cn) = from_certificate {
        return CallerIdentity::new(cn);
    }

    match declared.map(str::trim).filter(|d| !d.is_empty()) {
        Some(name) => CallerIdentity::new(name),
        None => CallerIdentity::unknown(),
    }
}

/// Reads caller credentials off an inbound request.
#[derive(Debug, Clone)]
pub struct IdentityExtractor {
    header: HeaderName,
}

impl IdentityExtractor {
    /// Create an extractor using `header` as the declared-identity fallback.
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Name of the declared-identity header.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Extract the caller identity from a request's certificate and headers.
    pub fn identify<B>(&self, request: &Request<B>) -> CallerIdentity {
        let subject = request
            .extensions()
            .get::<PeerCertificate>()
            .and_then(PeerCertificate::subject);
        self.identify_parts(subject, request.headers())
    }

    fn identify_parts(&self, subject: Option<&str>, headers: &HeaderMap) -> CallerIdentity {
        let declared = headers.get(&self.header).and_then(|v| v.to_str().ok());
        extract(subject, declared)
    }
}

impl Default for IdentityExtractor {
    fn default() -> Self {
        Self::new(HeaderName::from_static("x-client-service"))
    }
}
