//! Authentication infrastructure
//!
//! Credential hashing, token signing and the login/authorization flow.

mod jwt;
mod password;
mod service;

pub use jwt::{
    IssuedToken, JwtConfig, JwtGenerator, JwtService, TokenClaims,
    DEFAULT_TOKEN_EXPIRATION_HOURS, MAX_TOKEN_EXPIRATION_HOURS,
};
pub use password::{Argon2Hasher, PasswordHasher};
pub use service::{authorize_self, AuthService};
