//! Per-request execution context

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio_util::sync::CancellationToken;

use crate::api::state::AppState;

/// Cancellation context handed to store operations
///
/// A child of the process shutdown token, so shutting down cancels work that
/// is still in flight. Dropping the handler (client gone, timeout) drops the
/// pending store future as well.
#[derive(Debug, Clone)]
pub struct RequestContext(pub CancellationToken);

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestContext(state.shutdown.child_token()))
    }
}
