//! Store factory for runtime backend selection

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::domain::{DomainError, Store};

use super::in_memory::InMemoryStore;
use super::migrations::run_store_migrations;
use super::postgres::PostgresStore;

/// Supported store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// Process memory, lost on restart
    InMemory,
    /// PostgreSQL
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Timeout for acquiring a connection, in seconds
    pub connect_timeout_secs: u64,
    /// Apply pending schema migrations on startup
    pub run_migrations: bool,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            connect_timeout_secs: 30,
            run_migrations: true,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

/// Which backend to build and how
#[derive(Debug, Clone)]
pub enum StoreConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StoreConfig {
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating store instances
#[derive(Debug)]
pub struct StoreFactory;

impl StoreFactory {
    /// Creates the configured store, migrating the schema first when requested
    pub async fn create(config: &StoreConfig) -> Result<Arc<dyn Store>, DomainError> {
        match config {
            StoreConfig::InMemory => {
                info!("Using in-memory store");
                Ok(Arc::new(InMemoryStore::new()))
            }
            StoreConfig::Postgres(pg_config) => {
                let pool = Self::connect_pool(pg_config).await?;

                if pg_config.run_migrations {
                    let applied = run_store_migrations(&pool).await?;
                    info!(applied, "Store migrations complete");
                }

                info!(
                    max_connections = pg_config.max_connections,
                    "Using PostgreSQL store"
                );
                Ok(Arc::new(PostgresStore::new(pool)))
            }
        }
    }

    /// Opens a PostgreSQL connection pool
    pub async fn connect_pool(config: &PostgresConfig) -> Result<PgPool, DomainError> {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::internal(format!("Failed to connect to PostgreSQL: {}", e)))
    }
}
