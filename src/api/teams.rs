//! Team and membership endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::middleware::{RequestContext, RequireSelf, RequireVolunteer};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::validate_team_id;
use crate::domain::{DomainError, Team, Volunteer};

pub fn create_teams_router() -> Router<AppState> {
    Router::new()
        .route("/v1/teams", post(create_team))
        .route("/v1/teams/{id}", get(get_team))
        .route("/v1/teams/{id}/members", get(list_members))
        .route(
            "/v1/teams/{id}/members/{email}",
            put(add_member).delete(remove_member),
        )
}

/// Team creation request
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateTeamRequest {
    fn into_team(self) -> Result<Team, ApiError> {
        validate_team_id(&self.id)
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("id"))?;

        Ok(Team {
            id: self.id,
            name: self.name.filter(|name| !name.is_empty()),
        })
    }
}

/// POST /v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    RequireVolunteer(email): RequireVolunteer,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = request.into_team()?;

    state.store.create_team(&ctx, &team).await?;

    info!(team_id = %team.id, created_by = %email, "Team created");
    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /v1/teams/{id}
pub async fn get_team(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    _volunteer: RequireVolunteer,
    Path(id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let team = state.store.get_team_by_id(&ctx, &id).await?;
    Ok(Json(team))
}

/// GET /v1/teams/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    _volunteer: RequireVolunteer,
    Path(id): Path<String>,
) -> Result<Json<Vec<Volunteer>>, ApiError> {
    let members = state.store.list_team_members(&ctx, &id).await?;
    Ok(Json(members))
}

/// PUT /v1/teams/{id}/members/{email}
///
/// Joining a team twice is a no-op that still answers 201.
pub async fn add_member(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    RequireSelf(email): RequireSelf,
    Path((id, _)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    match state.store.add_team_member(&ctx, &id, &email).await {
        Ok(()) => {
            info!(team_id = %id, email = %email, "Volunteer joined team");
            Ok(StatusCode::CREATED)
        }
        Err(DomainError::AlreadyExists { .. }) => {
            debug!(team_id = %id, email = %email, "Volunteer already a member");
            Ok(StatusCode::CREATED)
        }
        Err(e) => Err(e.into()),
    }
}

/// DELETE /v1/teams/{id}/members/{email}
pub async fn remove_member(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    RequireSelf(email): RequireSelf,
    Path((id, _)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.store.remove_team_member(&ctx, &id, &email).await?;

    info!(team_id = %id, email = %email, "Volunteer left team");
    Ok(StatusCode::NO_CONTENT)
}
