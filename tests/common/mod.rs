//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use security_middleware::config::MiddlewareConfig;
use security_middleware::HttpServer;

pub const PRODUCT_BODY: &str = r#"{"id":1,"name":"Widget","price":9.99}"#;

/// How long `GET /api/slow` takes to answer.
pub const SLOW_BACKEND_DELAY: Duration = Duration::from_millis(800);

/// Start a mock backend on an ephemeral port.
///
/// - `GET /api/product` returns [`PRODUCT_BODY`]
/// - `/api/missing` answers 404, `/api/boom` answers 500
/// - `/soap/xml` answers a SOAP envelope as `text/xml`
/// - `GET /api/slow` answers after [`SLOW_BACKEND_DELAY`]
/// - anything else echoes the request it received as JSON
pub async fn start_mock_backend() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/product",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], PRODUCT_BODY) }),
        )
        .route(
            "/api/missing",
            any(|| async { (StatusCode::NOT_FOUND, "no such thing") }),
        )
        .route(
            "/api/boom",
            any(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/soap/xml",
            any(|| async {
                (
                    [(header::CONTENT_TYPE, "text/xml")],
                    "<soap:Envelope><soap:Body>ok</soap:Body></soap:Envelope>",
                )
            }),
        )
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(SLOW_BACKEND_DELAY).await;
                "done"
            }),
        )
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn echo(request: Request<Body>) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    };

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "callerService": header("x-caller-service"),
        "protocolType": header("x-protocol-type"),
        "contentType": header("content-type"),
        "accept": header("accept"),
        "authorization": header("authorization"),
        "body": String::from_utf8_lossy(&body),
    }))
}

/// An address nothing is listening on.
pub fn unreachable_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Default configuration pointed at `backend`.
pub fn test_config(backend: SocketAddr) -> MiddlewareConfig {
    let mut config = MiddlewareConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backend.base_url = format!("http://{backend}");
    config
}

pub fn server(config: MiddlewareConfig) -> HttpServer {
    HttpServer::new(config).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
