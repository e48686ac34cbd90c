//! Tests for the admin reporting endpoints.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt;

use security_middleware::http::X_PROXIED_BY;

mod common;

fn get(path: &str, caller: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(caller) = caller {
        builder = builder.header("X-Client-Service", caller);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_up() {
    let server = common::server(common::test_config(common::unreachable_addr()));

    let response = server
        .router()
        .oneshot(get("/admin/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "UP");
    assert_eq!(body["service"], "security-middleware");
    assert!(server.state().audit.is_empty());
}

#[tokio::test]
async fn stats_count_trusted_callers_only() {
    let backend = common::start_mock_backend().await;
    let server = common::server(common::test_config(backend));

    for caller in ["order-bff", "order-bff", "user-bff", "random-svc"] {
        let response = server
            .router()
            .oneshot(get("/api/product", Some(caller)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = server
        .router()
        .oneshot(get("/admin/stats", None))
        .await
        .unwrap();
    let body = common::body_json(response).await;

    assert_eq!(body["requestsByService"]["order-bff"], 2);
    assert_eq!(body["requestsByService"]["user-bff"], 1);
    assert!(body["requestsByService"].get("random-svc").is_none());
}

#[tokio::test]
async fn logs_return_most_recent_entries_oldest_first() {
    let backend = common::start_mock_backend().await;
    let server = common::server(common::test_config(backend));

    for i in 1..=5 {
        server
            .router()
            .oneshot(get(&format!("/api/item/{i}"), Some("order-bff")))
            .await
            .unwrap();
    }

    let response = server
        .router()
        .oneshot(get("/admin/logs?limit=2", None))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    let entries = body.as_array().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["endpoint"], "/api/item/4");
    assert_eq!(entries[1]["endpoint"], "/api/item/5");
    assert_eq!(entries[1]["callerService"], "order-bff");
    assert_eq!(entries[1]["protocolType"], "REST");
    assert_eq!(entries[1]["result"], "ALLOWED");
    assert!(entries[1]["requestId"].is_string());
    assert!(entries[1]["durationMs"].is_u64());
    assert!(entries[1].get("errorMessage").is_none());

    let response = server
        .router()
        .oneshot(get("/admin/logs", None))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn admin_reads_are_not_audited() {
    let backend = common::start_mock_backend().await;
    let server = common::server(common::test_config(backend));

    server
        .router()
        .oneshot(get("/admin/stats", Some("order-bff")))
        .await
        .unwrap();
    server
        .router()
        .oneshot(get("/admin/logs", Some("order-bff")))
        .await
        .unwrap();

    assert!(server.state().audit.is_empty());
    assert_eq!(server.state().trust.count("order-bff"), 0);
}

#[tokio::test]
async fn disabled_admin_paths_fall_through_to_the_gateway() {
    let backend = common::start_mock_backend().await;
    let mut config = common::test_config(backend);
    config.admin.enabled = false;
    let server = common::server(config);

    let response = server
        .router()
        .oneshot(get("/admin/health", Some("order-bff")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(&X_PROXIED_BY));
    let echoed = common::body_json(response).await;
    assert_eq!(echoed["path"], "/admin/health");
    assert_eq!(server.state().audit.len(), 1);
}
