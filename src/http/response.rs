//! Response assembly.
//!
//! # Responsibilities
//! - Return the backend payload verbatim with provenance headers
//! - Map gateway failures to JSON error bodies
//!
//! # Design Decisions
//! - Successful forwards always answer 200, whatever 2xx/3xx the backend used
//! - Error bodies are built with serde_json so messages are escaped

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::proxy::ForwardedResponse;

/// Name this middleware reports in `X-Proxied-By`.
pub const SERVICE_NAME: &str = "security-middleware";

pub const X_PROXIED_BY: HeaderName = HeaderName::from_static("x-proxied-by");
pub const X_CLIENT_VALIDATED: HeaderName = HeaderName::from_static("x-client-validated");

/// 200 response carrying the backend body and provenance headers.
pub fn proxied(forwarded: ForwardedResponse, validated: bool) -> Response {
    let mut response = Response::new(Body::from(forwarded.body));
    let headers = response.headers_mut();
    if let Some(content_type) = forwarded.content_type {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    headers.insert(X_PROXIED_BY, HeaderValue::from_static(SERVICE_NAME));
    headers.insert(
        X_CLIENT_VALIDATED,
        HeaderValue::from_static(if validated { "true" } else { "false" }),
    );
    response
}

/// JSON error body `{"error": message}` with the given status.
pub fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// 502 for a failed forward.
pub fn bad_gateway(message: &str) -> Response {
    error(StatusCode::BAD_GATEWAY, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[tokio::test]
    async fn proxied_keeps_body_and_adds_headers() {
        let response = proxied(
            ForwardedResponse {
                status: StatusCode::CREATED,
                content_type: Some(HeaderValue::from_static("text/xml")),
                body: Bytes::from_static(b"<ok/>"),
            },
            false,
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[&X_PROXIED_BY], "security-middleware");
        assert_eq!(response.headers()[&X_CLIENT_VALIDATED], "false");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"<ok/>");
    }

    #[tokio::test]
    async fn bad_gateway_escapes_message() {
        let response = bad_gateway("backend said \"no\"");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "backend said \"no\"");
    }
}
