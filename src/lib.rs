//! Volunteer Teams API
//!
//! Volunteers authenticate with an email and password (first login creates
//! the account) and receive a signed bearer token. Teams group volunteers;
//! a stats API guarded by Basic auth reports member counts per team.
//!
//! Storage is pluggable: an in-memory store for development and tests, and
//! a PostgreSQL store with versioned migrations.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use api::middleware::StatsCredentials;
use api::state::AppState;
use domain::Store;
use infrastructure::auth::{AuthService, JwtConfig, JwtService};

/// Wire the request handlers' shared state from a validated configuration
pub fn create_app_state(
    config: &AppConfig,
    store: Arc<dyn Store>,
    shutdown: CancellationToken,
) -> AppState {
    let jwt = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiration_hours,
    )));

    AppState::new(
        store.clone(),
        AuthService::new(store, jwt),
        StatsCredentials::new(config.stats.username.clone(), config.stats.password.clone()),
        shutdown,
    )
}
