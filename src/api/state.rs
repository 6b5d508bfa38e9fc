//! Application state shared by all handlers

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::middleware::StatsCredentials;
use crate::domain::Store;
use crate::infrastructure::auth::AuthService;

/// Handles injected into every request
///
/// Built once at start-up; the signing secret and stats credentials are
/// immutable for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub stats: StatsCredentials,
    /// Cancelled on shutdown; every request works on a child of it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        auth: AuthService,
        stats: StatsCredentials,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            auth,
            stats,
            shutdown,
        }
    }
}
