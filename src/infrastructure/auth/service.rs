//! Login and token-based authorization

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::volunteer::{validate_email, validate_password};
use crate::domain::{DomainError, Store};

use super::jwt::{IssuedToken, JwtGenerator};

/// Issues tokens on login and resolves them back to a volunteer email
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt: Arc<dyn JwtGenerator>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(store: Arc<dyn Store>, jwt: Arc<dyn JwtGenerator>) -> Self {
        Self { store, jwt }
    }

    /// Authenticate (or sign up) a volunteer and issue a token
    ///
    /// A password mismatch is returned as-is and no token is created.
    pub async fn login(
        &self,
        ctx: &CancellationToken,
        email: &str,
        password: &str,
    ) -> Result<IssuedToken, DomainError> {
        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        self.store.authenticate_or_create(ctx, email, password).await?;

        debug!(email = %email, "Volunteer authenticated");

        self.jwt.generate(email)
    }

    /// Resolve a bearer token to the email bound in it
    ///
    /// Any parse, signature or expiry failure yields `None`.
    pub fn verify(&self, token: &str) -> Option<String> {
        match self.jwt.validate(token) {
            Ok(claims) if !claims.email.is_empty() => Some(claims.email),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }

    pub fn token_expiration_hours(&self) -> u64 {
        self.jwt.expiration_hours()
    }
}

/// Require the authenticated email to be the one named in the request path
pub fn authorize_self(authenticated: Option<&str>, requested: &str) -> bool {
    matches!(authenticated, Some(email) if email == requested)
}
