//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define middleware metrics (requests, latency, trust decisions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `middleware_requests_total` (counter): mediated requests by protocol, result
//! - `middleware_forward_duration_seconds` (histogram): backend round-trip latency,
//!   sampled only for requests that were actually forwarded
//! - `middleware_trust_validations_total` (counter): validations by outcome
//! - `middleware_audit_entries` (gauge): entries currently held by the audit log
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality (no caller identities, no paths)

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::audit::AuditResult;
use crate::proxy::protocol::ProtocolType;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count a mediated request that never reached the backend.
pub fn record_outcome(protocol: ProtocolType, result: AuditResult) {
    counter!(
        "middleware_requests_total",
        "protocol" => protocol.as_str(),
        "result" => result.as_str()
    )
    .increment(1);
}

/// Count a forwarded request and sample its backend round trip.
pub fn record_forward(protocol: ProtocolType, result: AuditResult, elapsed: Duration) {
    record_outcome(protocol, result);
    histogram!(
        "middleware_forward_duration_seconds",
        "protocol" => protocol.as_str()
    )
    .record(elapsed.as_secs_f64());
}

/// Record a trust validation.
pub fn record_validation(trusted: bool) {
    counter!(
        "middleware_trust_validations_total",
        "trusted" => if trusted { "true" } else { "false" }
    )
    .increment(1);
}

/// Record the current audit log length.
pub fn record_audit_size(len: usize) {
    gauge!("middleware_audit_entries").set(len as f64);
}
