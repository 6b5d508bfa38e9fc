//! Healthcheck endpoint served on the loopback listener

use std::time::Instant;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::middleware::RequestContext;
use crate::api::types::Json;

use super::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .with_state(state)
}

/// 200 when the store answers, 503 otherwise
pub async fn health_check(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();

    let (status, code) = match state.store.healthcheck(&ctx).await {
        Ok(()) => (HealthStatus::Healthy, StatusCode::OK),
        Err(e) => {
            warn!(error = %e, "Store healthcheck failed");
            (HealthStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        latency_ms: start.elapsed().as_millis() as u64,
    };

    (code, Json(response))
}
