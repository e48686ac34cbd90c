//! Inbound request inspection.
//!
//! # Responsibilities
//! - Resolve the request ID used for tracing and the audit trail
//! - Read the headers the gateway cares about
//! - Normalize the forwarded path and query
//!
//! # Design Decisions
//! - The request ID layer runs first, so every request carries `x-request-id`
//! - A request ID that is not a UUID is replaced in the audit trail only

use axum::http::{HeaderMap, HeaderName, Uri};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Audit request ID: the inbound `x-request-id` when it is a UUID, else a fresh one.
pub fn request_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Value of a header when present and valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Path plus query string, as forwarded to the backend.
pub fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}
