//! Gateway request handling.
//!
//! Every inbound call walks the same states:
//!
//! ```text
//! RECEIVED → IDENTIFIED → VALIDATED → CLASSIFIED → FORWARDING → COMPLETED
//!                                                             ↘ FAILED
//! ```
//!
//! Trust is advisory unless the admission policy is fail-closed, in which
//! case an untrusted caller stops after CLASSIFIED with a 403.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Request, StatusCode},
    response::Response,
};

use crate::audit::{AuditEntry, AuditResult};
use crate::http::request::{header_str, path_and_query, request_id};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{classify, OutboundRequest};

/// Catch-all handler mediating every non-admin request.
pub async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers());

    // RECEIVED → IDENTIFIED
    let caller = state.identity.identify(&request);

    // IDENTIFIED → VALIDATED
    let validated = state.trust.is_trusted(&caller);
    if !validated && state.trust.admit_on_untrusted() {
        tracing::warn!(
            request_id = %request_id,
            caller = %caller,
            "Request from untrusted service, admitting (fail-open)"
        );
    }

    // VALIDATED → CLASSIFIED
    let protocol = classify(
        header_str(request.headers(), &header::CONTENT_TYPE),
        request.uri().path(),
    );

    let (parts, body) = request.into_parts();
    let mut outbound = OutboundRequest {
        request_id,
        path_and_query: path_and_query(&parts.uri),
        method: parts.method,
        headers: parts.headers,
        body: Bytes::new(),
        client_identity: caller.clone(),
        caller,
        protocol,
    };

    if !state.trust.admits(validated) {
        let message = format!("untrusted caller: {}", outbound.caller);
        metrics::record_outcome(protocol, AuditResult::Denied);
        state
            .audit
            .append(AuditEntry::denied(outbound.summary(), message.as_str()));
        return response::error(StatusCode::FORBIDDEN, &message);
    }

    outbound.body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let message = format!("failed to read request body: {e}");
            metrics::record_outcome(protocol, AuditResult::Error);
            state.audit.append(AuditEntry::error(
                outbound.summary(),
                Duration::ZERO,
                message.as_str(),
            ));
            return response::error(StatusCode::BAD_REQUEST, &message);
        }
    };

    // CLASSIFIED → FORWARDING → COMPLETED | FAILED
    //
    // The forward runs on its own task so a caller that disconnects does not
    // cancel it; it still completes and is audited.
    let forwarder = Arc::clone(&state.forwarder);
    let forwarding = tokio::spawn(async move { forwarder.forward(outbound).await });

    match forwarding.await {
        Ok(Ok(forwarded)) => response::proxied(forwarded, validated),
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Error forwarding request");
            response::bad_gateway(&e.to_string())
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Forwarding task failed");
            response::bad_gateway(&format!("forwarding task failed: {e}"))
        }
    }
}
