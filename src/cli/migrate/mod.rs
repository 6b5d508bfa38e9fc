//! Migrate command - applies pending PostgreSQL migrations

use tracing::info;

use crate::infrastructure::logging;
use crate::infrastructure::store::{run_store_migrations, PostgresMigrator, StoreFactory};

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    logging::init_logging(&config.logging)?;

    let pg_config = config.storage.postgres_config()?;
    let pool = StoreFactory::connect_pool(&pg_config).await?;

    let applied = run_store_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool.clone()).current_version().await?;

    info!(
        applied = applied,
        version = version.unwrap_or_default(),
        "Database schema is up to date"
    );

    pool.close().await;
    Ok(())
}
