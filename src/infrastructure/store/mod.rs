//! Store implementations
//!
//! Provides the in-memory and PostgreSQL backends of [`crate::domain::Store`],
//! their schema migrations and a factory selecting one at runtime.

mod factory;
mod in_memory;
mod migrations;
mod postgres;

#[cfg(test)]
mod contract;

pub use factory::{PostgresConfig, StorageType, StoreConfig, StoreFactory};
pub use in_memory::InMemoryStore;
pub use migrations::{run_store_migrations, store_migrations, Migration, PostgresMigrator};
pub use postgres::PostgresStore;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::domain::DomainError;

/// Run a backend future unless `ctx` is cancelled first
///
/// The future is dropped on cancellation, which aborts the pending backend call.
pub(crate) async fn cancellable<T, F>(ctx: &CancellationToken, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(DomainError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancellable_completes() {
        let ctx = CancellationToken::new();

        let result = cancellable(&ctx, async { Ok::<_, DomainError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_cancellable_already_cancelled() {
        let ctx = CancellationToken::new();
        ctx.cancel();

        let result = cancellable(&ctx, async { Ok::<_, DomainError>(42) }).await;
        assert_eq!(result.unwrap_err(), DomainError::Cancelled);
    }

    #[tokio::test]
    async fn test_cancellable_aborts_pending_future() {
        let ctx = CancellationToken::new();
        let canceller = ctx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = cancellable(&ctx, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, DomainError>(())
        })
        .await;

        assert_eq!(result.unwrap_err(), DomainError::Cancelled);
    }
}
