//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the backend URL and header names
//! - Reject retention and TLS settings that cannot work
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MiddlewareConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::MiddlewareConfig;
use crate::proxy::forwarder::BackendTarget;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("backend.base_url: {0}")]
    BackendUrl(String),

    #[error("trust.trusted_services contains a blank entry")]
    BlankTrustedService,

    #[error("trust.identity_header {0:?} is not a valid header name")]
    IdentityHeader(String),

    #[error("audit.max_entries must be greater than zero")]
    ZeroRetention,

    #[error("listener.tls.require_client_cert needs listener.tls.client_ca_path")]
    ClientCaMissing,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &MiddlewareConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if let Err(e) = BackendTarget::parse(&config.backend.base_url) {
        errors.push(ValidationError::BackendUrl(e.to_string()));
    }

    if config
        .trust
        .trusted_services
        .iter()
        .any(|s| s.trim().is_empty())
    {
        errors.push(ValidationError::BlankTrustedService);
    }

    if HeaderName::from_bytes(config.trust.identity_header.as_bytes()).is_err() {
        errors.push(ValidationError::IdentityHeader(
            config.trust.identity_header.clone(),
        ));
    }

    if config.audit.max_entries == Some(0) {
        errors.push(ValidationError::ZeroRetention);
    }

    if let Some(tls) = &config.listener.tls {
        if tls.require_client_cert && tls.client_ca_path.is_none() {
            errors.push(ValidationError::ClientCaMissing);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&MiddlewareConfig::default()).is_ok());
    }

    #[test]
    fn blank_trusted_service_rejected() {
        let mut config = MiddlewareConfig::default();
        config.trust.trusted_services.push("  ".into());
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::BlankTrustedService]
        );
    }

    #[test]
    fn bad_identity_header_rejected() {
        let mut config = MiddlewareConfig::default();
        config.trust.identity_header = "X Client".into();
        assert!(matches!(
            validate_config(&config).unwrap_err().as_slice(),
            [ValidationError::IdentityHeader(_)]
        ));
    }

    #[test]
    fn zero_retention_rejected() {
        let mut config = MiddlewareConfig::default();
        config.audit.max_entries = Some(0);
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ZeroRetention]
        );
    }

    #[test]
    fn required_client_cert_needs_ca() {
        let mut config = MiddlewareConfig::default();
        config.listener.tls = Some(TlsConfig {
            cert_path: "server.pem".into(),
            key_path: "server.key".into(),
            client_ca_path: None,
            require_client_cert: true,
        });
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ClientCaMissing]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = MiddlewareConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(matches!(
            validate_config(&config).unwrap_err().as_slice(),
            [ValidationError::MetricsAddress(_)]
        ));
    }
}
