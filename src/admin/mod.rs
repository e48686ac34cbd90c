//! Admin reporting surface.
//!
//! Read-only views over shared state: per-caller counters, the audit
//! trail and a liveness probe. Routes are static, so they win over the
//! gateway catch-all when mounted.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::{health, logs, stats};
use crate::http::server::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/logs", get(logs))
        .route("/admin/health", get(health))
}
