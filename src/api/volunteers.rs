//! Volunteer endpoints
//!
//! Login doubles as sign-up: the first login for an email creates the account.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{RequestContext, RequireVolunteer};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::Volunteer;

pub fn create_volunteers_router() -> Router<AppState> {
    Router::new()
        .route("/v1/volunteers/login", post(login))
        .route("/v1/volunteers/me", get(get_me))
}

/// Login request
///
/// Missing fields decode as empty and are rejected by validation.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// POST /v1/volunteers/login
pub async fn login(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .auth
        .login(&ctx, &request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        expires_at: issued.claims.expires_at().map(|t| t.to_rfc3339()),
        token: issued.token,
    }))
}

/// GET /v1/volunteers/me
pub async fn get_me(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    RequireVolunteer(email): RequireVolunteer,
) -> Result<Json<Volunteer>, ApiError> {
    let volunteer = state.store.get_volunteer_by_email(&ctx, &email).await?;
    Ok(Json(volunteer))
}
