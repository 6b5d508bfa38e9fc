//! HTTP Basic authentication for the stats API

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Username and password accepted by the stats API
#[derive(Clone)]
pub struct StatsCredentials {
    username: String,
    password: String,
}

impl StatsCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Compares both fields in constant time
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let password_ok = self.password.as_bytes().ct_eq(password.as_bytes());

        bool::from(username_ok & password_ok)
    }
}

impl std::fmt::Debug for StatsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCredentials")
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}

/// Rejection asking the client for Basic credentials
#[derive(Debug)]
pub struct BasicAuthRejection(ApiError);

impl IntoResponse for BasicAuthRejection {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"stats\""),
        );
        response
    }
}

/// Extractor guarding the stats API with the configured Basic credentials
#[derive(Debug, Clone, Copy)]
pub struct RequireStatsAuth;

impl FromRequestParts<AppState> for RequireStatsAuth {
    type Rejection = BasicAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) = extract_basic_credentials(&parts.headers).ok_or_else(|| {
            BasicAuthRejection(ApiError::unauthorized("Basic authentication required"))
        })?;

        if !state.stats.matches(&username, &password) {
            debug!(username = %username, "Rejected stats credentials");
            return Err(BasicAuthRejection(ApiError::unauthorized(
                "Invalid stats credentials",
            )));
        }

        Ok(RequireStatsAuth)
    }
}

/// Decode `Authorization: Basic <base64(user:pass)>`
pub fn extract_basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?.trim();

    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
