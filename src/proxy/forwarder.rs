//! Backend forwarding.
//!
//! # Responsibilities
//! - Send one outbound call per inbound request, same path and method
//! - Propagate `Content-Type` and `Accept`, inject caller/protocol headers
//! - Time the call and append exactly one audit entry per attempt
//! - Return the backend payload untouched
//!
//! # Design Decisions
//! - No retries, no backoff, no timeout beyond the transport default
//! - 4xx/5xx backend statuses are forwarding failures
//! - The payload is opaque bytes: REST JSON, GraphQL JSON and SOAP XML
//!   pass through identically

use std::error::Error as StdError;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::uri::{Authority, Scheme};
use axum::http::{
    header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditLog, AuditResult, RequestSummary};
use crate::observability::metrics;
use crate::proxy::protocol::ProtocolType;
use crate::security::CallerIdentity;

/// Header naming the caller service on the outbound request.
pub const X_CALLER_SERVICE: HeaderName = HeaderName::from_static("x-caller-service");
/// Header naming the classified protocol on the outbound request.
pub const X_PROTOCOL_TYPE: HeaderName = HeaderName::from_static("x-protocol-type");

/// Errors produced while forwarding to the backend.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBackend { url: String, reason: String },

    #[error("invalid outbound request: {0}")]
    InvalidRequest(String),

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("{status} from {method} {uri}")]
    Status {
        status: StatusCode,
        method: Method,
        uri: Uri,
    },

    #[error("failed to read backend response: {0}")]
    Body(String),
}

/// Where forwarded requests are sent.
#[derive(Debug, Clone)]
pub struct BackendTarget {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
}

impl BackendTarget {
    /// Parse an absolute `http://host[:port][/prefix]` URL.
    pub fn parse(url: &str) -> Result<Self, ForwardError> {
        let invalid = |reason: &str| ForwardError::InvalidBackend {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri = Uri::from_str(url).map_err(|e| invalid(&e.to_string()))?;
        let scheme = uri.scheme().cloned().ok_or_else(|| invalid("missing scheme"))?;
        if scheme != Scheme::HTTP {
            return Err(invalid("only http:// backends are supported"));
        }
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| invalid("missing host"))?;

        Ok(Self {
            scheme,
            authority,
            base_path: uri.path().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URI for an inbound path and query.
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, ForwardError> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(format!("{}{}", self.base_path, path_and_query))
            .build()
            .map_err(|e| ForwardError::InvalidRequest(e.to_string()))
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

/// A request ready to be forwarded.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub request_id: Uuid,
    pub path_and_query: String,
    pub method: Method,
    /// Inbound headers. Only `Content-Type` and `Accept` are propagated.
    pub headers: HeaderMap,
    pub body: Bytes,
    pub caller: CallerIdentity,
    pub client_identity: CallerIdentity,
    pub protocol: ProtocolType,
}

impl OutboundRequest {
    pub fn summary(&self) -> RequestSummary {
        RequestSummary {
            request_id: self.request_id,
            caller_service: self.caller.to_string(),
            client_identity: self.client_identity.to_string(),
            endpoint: self.path_and_query.clone(),
            method: self.method.to_string(),
            protocol_type: self.protocol,
        }
    }
}

/// Backend payload of a successful forward.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Methods whose inbound body is forwarded.
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Sends mediated requests to the backend and audits each outcome.
#[derive(Clone)]
pub struct ProxyForwarder {
    client: Client<HttpConnector, Body>,
    target: BackendTarget,
    audit: Arc<AuditLog>,
}

impl ProxyForwarder {
    pub fn new(target: BackendTarget, audit: Arc<AuditLog>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            target,
            audit,
        }
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    /// Forward `request` and record the outcome in the audit log.
    pub async fn forward(
        &self,
        request: OutboundRequest,
    ) -> Result<ForwardedResponse, ForwardError> {
        let start = Instant::now();
        let summary = request.summary();
        let protocol = request.protocol;

        tracing::debug!(
            request_id = %request.request_id,
            protocol = %protocol,
            method = %request.method,
            path = %request.path_and_query,
            "Forwarding request to backend"
        );

        let result = self.send(request).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                metrics::record_forward(protocol, AuditResult::Allowed, elapsed);
                self.audit.append(AuditEntry::allowed(summary, elapsed));
            }
            Err(e) => {
                metrics::record_forward(protocol, AuditResult::Error, elapsed);
                self.audit
                    .append(AuditEntry::error(summary, elapsed, e.to_string()));
            }
        }

        result
    }

    async fn send(&self, request: OutboundRequest) -> Result<ForwardedResponse, ForwardError> {
        let uri = self.target.uri_for(&request.path_and_query)?;
        let method = request.method;

        let mut builder = Request::builder().method(method.clone()).uri(uri.clone());
        if let Some(headers) = builder.headers_mut() {
            for name in [header::CONTENT_TYPE, header::ACCEPT] {
                if let Some(value) = request.headers.get(&name) {
                    headers.insert(name, value.clone());
                }
            }
            // Certificate CNs may be non-ASCII UTF-8; those bytes are valid
            // header octets even though `from_str` rejects them.
            let caller = HeaderValue::from_bytes(request.caller.as_str().as_bytes())
                .map_err(|_| {
                    ForwardError::InvalidRequest(format!(
                        "caller identity {:?} is not a valid header value",
                        request.caller.as_str()
                    ))
                })?;
            headers.insert(X_CALLER_SERVICE, caller);
            headers.insert(
                X_PROTOCOL_TYPE,
                HeaderValue::from_static(request.protocol.as_str()),
            );
        }

        let body = if carries_body(&method) && !request.body.is_empty() {
            Body::from(request.body)
        } else {
            Body::empty()
        };

        let outbound = builder
            .body(body)
            .map_err(|e| ForwardError::InvalidRequest(e.to_string()))?;

        let response: Response<Incoming> = self
            .client
            .request(outbound)
            .await
            .map_err(|e| ForwardError::Unreachable(error_chain(&e)))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ForwardError::Status {
                status,
                method,
                uri,
            });
        }

        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX)
            .await
            .map_err(|e| ForwardError::Body(error_chain(&e)))?;

        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Render an error with all of its sources, outermost first.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parses_host_and_prefix() {
        let target = BackendTarget::parse("http://backend:8080/").unwrap();
        assert_eq!(target.authority().as_str(), "backend:8080");
        assert_eq!(
            target.uri_for("/api/product?id=1").unwrap().to_string(),
            "http://backend:8080/api/product?id=1"
        );

        let target = BackendTarget::parse("http://backend:8080/shop").unwrap();
        assert_eq!(
            target.uri_for("/api/cart").unwrap().to_string(),
            "http://backend:8080/shop/api/cart"
        );
    }

    #[test]
    fn target_rejects_unsupported_urls() {
        assert!(BackendTarget::parse("https://backend").is_err());
        assert!(BackendTarget::parse("/relative/only").is_err());
        assert!(BackendTarget::parse("not a url").is_err());
    }

    #[test]
    fn body_methods() {
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PUT));
        assert!(carries_body(&Method::PATCH));
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
        assert!(!carries_body(&Method::HEAD));
    }

    #[test]
    fn status_error_message() {
        let err = ForwardError::Status {
            status: StatusCode::NOT_FOUND,
            method: Method::GET,
            uri: Uri::from_static("http://backend:8080/api/missing"),
        };
        assert_eq!(
            err.to_string(),
            "404 Not Found from GET http://backend:8080/api/missing"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_audited_as_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let audit = Arc::new(AuditLog::new());
        let target = BackendTarget::parse(&format!("http://{addr}")).unwrap();
        let forwarder = ProxyForwarder::new(target, Arc::clone(&audit));

        let result = forwarder
            .forward(OutboundRequest {
                request_id: Uuid::new_v4(),
                path_and_query: "/api/product".into(),
                method: Method::GET,
                headers: HeaderMap::new(),
                body: Bytes::new(),
                caller: "order-bff".into(),
                client_identity: "order-bff".into(),
                protocol: ProtocolType::Rest,
            })
            .await;

        assert!(matches!(result, Err(ForwardError::Unreachable(_))));
        let entries = audit.recent(1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].result, AuditResult::Error);
        assert!(entries[0].error_message.is_some());
        assert_eq!(entries[0].endpoint, "/api/product");
    }
}
