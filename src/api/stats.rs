//! Stats endpoints guarded by Basic authentication

use axum::{extract::State, routing::get, Router};

use crate::api::middleware::{RequestContext, RequireStatsAuth};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::TeamMemberCounts;

pub fn create_stats_router() -> Router<AppState> {
    Router::new().route("/v1/stats/teams/member-count", get(team_member_counts))
}

/// GET /v1/stats/teams/member-count
///
/// Teams without members are absent from the mapping.
pub async fn team_member_counts(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    _auth: RequireStatsAuth,
) -> Result<Json<TeamMemberCounts>, ApiError> {
    let counts = state.store.count_team_members(&ctx).await?;
    Ok(Json(counts))
}
