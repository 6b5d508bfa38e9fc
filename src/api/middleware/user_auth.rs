//! Volunteer authentication using bearer tokens

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::authorize_self;

/// Extractor that requires a valid token
///
/// Carries the email bound in the token from `Authorization: Bearer <token>`.
/// Missing, malformed, forged and expired tokens are all rejected with 401.
#[derive(Debug, Clone)]
pub struct RequireVolunteer(pub String);

impl FromRequestParts<AppState> for RequireVolunteer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        state
            .auth
            .verify(&token)
            .map(RequireVolunteer)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
    }
}

/// Extractor that requires the token's email to match the `{email}` path segment
///
/// Used by membership mutations, so a volunteer can only join or leave a team
/// on their own behalf.
#[derive(Debug, Clone)]
pub struct RequireSelf(pub String);

impl FromRequestParts<AppState> for RequireSelf {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authenticated = extract_jwt_token(&parts.headers)
            .ok()
            .and_then(|token| state.auth.verify(&token));

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid path parameters"))?;

        let requested = params.get("email").map(String::as_str).unwrap_or_default();

        if !authorize_self(authenticated.as_deref(), requested) {
            debug!(requested = %requested, "Token does not belong to the requested volunteer");
            return Err(ApiError::unauthorized(
                "Token does not authorize acting on behalf of this volunteer",
            ));
        }

        Ok(RequireSelf(requested.to_string()))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
    ))
}
