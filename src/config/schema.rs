//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the middleware.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the security middleware.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Listener configuration (bind address, TLS, body limit).
    pub listener: ListenerConfig,

    /// Backend service every inbound call is forwarded to.
    pub backend: BackendConfig,

    /// Caller trust settings.
    pub trust: TrustConfig,

    /// Audit trail retention.
    pub audit: AuditConfig,

    /// Admin reporting surface.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8082").
    pub bind_address: String,

    /// Optional TLS configuration. Enables client certificate identity.
    pub tls: Option<TlsConfig>,

    /// Largest inbound request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8082".to_string(),
            tls: None,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,

    /// CA bundle (PEM) used to verify client certificates.
    /// Without it no client certificate is requested.
    #[serde(default)]
    pub client_ca_path: Option<String>,

    /// Reject handshakes that present no client certificate.
    #[serde(default)]
    pub require_client_cert: bool,
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://localhost:8080").
    /// A path component is prefixed to every forwarded path.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Caller trust configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Caller identities accepted as known-good.
    pub trusted_services: Vec<String>,

    /// Forward requests from untrusted callers anyway (fail-open).
    pub admit_on_untrusted: bool,

    /// Header carrying the declared caller identity when no client
    /// certificate is available.
    pub identity_header: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            trusted_services: vec![
                "user-bff".to_string(),
                "order-bff".to_string(),
                "security-middleware".to_string(),
            ],
            admit_on_untrusted: true,
            identity_header: "X-Client-Service".to_string(),
        }
    }
}

/// Audit trail configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum entries retained in memory. Unbounded when absent;
    /// otherwise the oldest entries are evicted first.
    pub max_entries: Option<usize>,
}

/// Admin reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve `/admin/stats`, `/admin/logs` and `/admin/health`.
    pub enabled: bool,

    /// Number of audit entries returned by `/admin/logs` without `?limit=`.
    pub default_log_limit: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_log_limit: 50,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
