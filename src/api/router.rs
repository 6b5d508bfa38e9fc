use std::time::Duration;

use axum::{http::StatusCode, middleware, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::middleware::logging_middleware;
use super::state::AppState;
use super::{stats, teams, volunteers};

/// Create the public API router
///
/// `request_timeout` bounds how long a single request may run.
pub fn create_router(state: AppState, request_timeout: Option<Duration>) -> Router {
    let router = Router::new()
        .merge(volunteers::create_volunteers_router())
        .merge(teams::create_teams_router())
        .merge(stats::create_stats_router())
        .route_layer(middleware::from_fn(logging_middleware))
        .with_state(state);

    let router = match request_timeout {
        Some(timeout) => router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        )),
        None => router,
    };

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
