//! API middleware components

pub mod context;
pub mod logging;
pub mod stats_auth;
pub mod user_auth;

pub use context::RequestContext;
pub use logging::logging_middleware;
pub use stats_auth::{RequireStatsAuth, StatsCredentials};
pub use user_auth::{RequireSelf, RequireVolunteer};
