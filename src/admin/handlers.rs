use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::http::response::SERVICE_NAME;
use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub requests_by_service: BTreeMap<String, u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Requests seen per trusted caller.
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        requests_by_service: state.trust.counts(),
    })
}

/// Most recent audit entries, oldest first.
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<AuditEntry>> {
    let limit = query.limit.unwrap_or(state.default_log_limit);
    Json(state.audit.recent(limit))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        service: SERVICE_NAME,
    })
}
