//! Audit entry types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proxy::protocol::ProtocolType;

/// Outcome recorded for a mediated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResult {
    /// The backend answered successfully.
    Allowed,
    /// Forwarding failed or the backend answered with an error status.
    Error,
    /// The caller was untrusted and the admission policy refused it.
    Denied,
}

impl AuditResult {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditResult::Allowed => "ALLOWED",
            AuditResult::Error => "ERROR",
            AuditResult::Denied => "DENIED",
        }
    }
}

/// What is known about a request before its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub request_id: Uuid,
    pub caller_service: String,
    pub client_identity: String,
    pub endpoint: String,
    pub method: String,
    pub protocol_type: ProtocolType,
}

/// One immutable record in the audit trail.
///
/// Every non-`Allowed` entry carries an `error_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub request_id: Uuid,
    pub caller_service: String,
    pub endpoint: String,
    pub method: String,
    pub protocol_type: ProtocolType,
    pub result: AuditResult,
    pub client_identity: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AuditEntry {
    /// Entry for a request the backend answered successfully.
    pub fn allowed(summary: RequestSummary, duration: Duration) -> Self {
        Self::build(summary, AuditResult::Allowed, duration, None)
    }

    /// Entry for a request whose forwarding failed.
    pub fn error(summary: RequestSummary, duration: Duration, message: impl Into<String>) -> Self {
        Self::build(summary, AuditResult::Error, duration, Some(message.into()))
    }

    /// Entry for a request refused before forwarding.
    pub fn denied(summary: RequestSummary, message: impl Into<String>) -> Self {
        Self::build(
            summary,
            AuditResult::Denied,
            Duration::ZERO,
            Some(message.into()),
        )
    }

    fn build(
        summary: RequestSummary,
        result: AuditResult,
        duration: Duration,
        error_message: Option<String>,
    ) -> Self {
        Self {
            request_id: summary.request_id,
            caller_service: summary.caller_service,
            endpoint: summary.endpoint,
            method: summary.method,
            protocol_type: summary.protocol_type,
            result,
            client_identity: summary.client_identity,
            timestamp: Utc::now(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RequestSummary {
        RequestSummary {
            request_id: Uuid::new_v4(),
            caller_service: "order-bff".into(),
            client_identity: "order-bff".into(),
            endpoint: "/api/order/submit?draft=true".into(),
            method: "POST".into(),
            protocol_type: ProtocolType::Rest,
        }
    }

    #[test]
    fn allowed_has_no_message() {
        let entry = AuditEntry::allowed(summary(), Duration::from_millis(12));
        assert_eq!(entry.result, AuditResult::Allowed);
        assert_eq!(entry.duration_ms, 12);
        assert!(entry.error_message.is_none());
    }

    #[test]
    fn error_and_denied_carry_message() {
        let entry = AuditEntry::error(summary(), Duration::from_millis(3), "connection refused");
        assert_eq!(entry.result, AuditResult::Error);
        assert_eq!(entry.error_message.as_deref(), Some("connection refused"));

        let entry = AuditEntry::denied(summary(), "untrusted caller: x");
        assert_eq!(entry.result, AuditResult::Denied);
        assert_eq!(entry.duration_ms, 0);
        assert!(entry.error_message.is_some());
    }

    #[test]
    fn serializes_camel_case() {
        let entry = AuditEntry::allowed(summary(), Duration::from_millis(5));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["callerService"], "order-bff");
        assert_eq!(json["clientIdentity"], "order-bff");
        assert_eq!(json["protocolType"], "REST");
        assert_eq!(json["result"], "ALLOWED");
        assert_eq!(json["durationMs"], 5);
        assert!(json.get("errorMessage").is_none());
        assert!(json["requestId"].is_string());
    }
}
