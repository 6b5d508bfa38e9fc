use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::auth::{DEFAULT_TOKEN_EXPIRATION_HOURS, MAX_TOKEN_EXPIRATION_HOURS};
use crate::infrastructure::store::{PostgresConfig, StorageType, StoreConfig};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub healthcheck: HealthcheckConfig,
    pub stats: StatsConfig,
    pub auth: AuthConfig,
    pub storage: StorageSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request duration, 0 disables the timeout
    pub request_timeout_secs: u64,
}

/// Healthcheck listener, always bound to the loopback interface
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthcheckConfig {
    pub port: u16,
}

/// Basic auth credentials guarding the stats API
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Reasons a loaded configuration cannot be served
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("auth.jwt_secret must be set")]
    MissingJwtSecret,
    #[error("stats.username and stats.password must be set")]
    MissingStatsCredentials,
    #[error(
        "auth.token_expiration_hours must be between 1 and {}",
        MAX_TOKEN_EXPIRATION_HOURS
    )]
    InvalidTokenExpiration,
    #[error("unknown storage backend '{0}'")]
    UnknownBackend(String),
    #[error("storage.database_url is required for the postgres backend")]
    MissingDatabaseUrl,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            request_timeout_secs: 30,
        }
    }
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self { port: 8899 }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiration_hours: DEFAULT_TOKEN_EXPIRATION_HOURS,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
            run_migrations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl std::fmt::Debug for StatsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsConfig")
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[hidden]")
            .field("token_expiration_hours", &self.token_expiration_hours)
            .finish()
    }
}

impl StorageSettings {
    /// Resolves the backend selection into a store configuration
    pub fn store_config(&self) -> Result<StoreConfig, ConfigValidationError> {
        match StorageType::from_str(&self.backend) {
            Some(StorageType::InMemory) => Ok(StoreConfig::InMemory),
            Some(StorageType::Postgres) => Ok(StoreConfig::Postgres(self.postgres_config()?)),
            None => Err(ConfigValidationError::UnknownBackend(self.backend.clone())),
        }
    }

    /// PostgreSQL settings regardless of the selected backend
    pub fn postgres_config(&self) -> Result<PostgresConfig, ConfigValidationError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigValidationError::MissingDatabaseUrl)?;

        Ok(PostgresConfig::new(url)
            .with_max_connections(self.max_connections)
            .with_connect_timeout(self.connect_timeout_secs)
            .with_run_migrations(self.run_migrations))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Checks the settings `serve` cannot run without
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigValidationError::MissingJwtSecret);
        }

        if !(1..=MAX_TOKEN_EXPIRATION_HOURS).contains(&self.auth.token_expiration_hours) {
            return Err(ConfigValidationError::InvalidTokenExpiration);
        }

        if self.stats.username.is_empty() || self.stats.password.is_empty() {
            return Err(ConfigValidationError::MissingStatsCredentials);
        }

        self.storage.store_config()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config.stats.username = "stats".to_string();
        config.stats.password = "stats-password".to_string();
        config
    }

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8888);
        assert_eq!(config.healthcheck.port, 8899);
        assert_eq!(config.auth.token_expiration_hours, 72);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config = from_toml(
            r#"
            [auth]
            jwt_secret = "abc"

            [logging]
            format = "json"
            "#,
        );

        assert_eq!(config.auth.jwt_secret, "abc");
        assert_eq!(config.auth.token_expiration_hours, 72);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8888);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_validate_requires_jwt_secret() {
        let mut config = valid();
        config.auth.jwt_secret.clear();

        assert_eq!(config.validate(), Err(ConfigValidationError::MissingJwtSecret));
    }

    #[test]
    fn test_validate_requires_stats_credentials() {
        let mut config = valid();
        config.stats.password.clear();

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingStatsCredentials)
        );
    }

    #[test]
    fn test_validate_rejects_zero_expiration() {
        let mut config = valid();
        config.auth.token_expiration_hours = 0;

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidTokenExpiration)
        );
    }

    #[test]
    fn test_validate_bounds_expiration() {
        let mut config = valid();

        config.auth.token_expiration_hours = MAX_TOKEN_EXPIRATION_HOURS;
        assert!(config.validate().is_ok());

        for hours in [MAX_TOKEN_EXPIRATION_HOURS + 1, u64::MAX / 2] {
            config.auth.token_expiration_hours = hours;
            assert_eq!(
                config.validate(),
                Err(ConfigValidationError::InvalidTokenExpiration)
            );
        }
    }

    #[test]
    fn test_loaded_oversized_expiration_rejected() {
        let config = from_toml(
            r#"
            [auth]
            jwt_secret = "s"
            token_expiration_hours = 9223372036854775807

            [stats]
            username = "u"
            password = "p"
            "#,
        );

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidTokenExpiration)
        );
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = valid();
        config.storage.backend = "postgres".to_string();

        assert_eq!(config.validate(), Err(ConfigValidationError::MissingDatabaseUrl));

        config.storage.database_url = Some("postgres://localhost/volunteers".to_string());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_unknown_backend() {
        let mut config = valid();
        config.storage.backend = "sqlite".to_string();

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownBackend("sqlite".to_string()))
        );
    }

    #[test]
    fn test_store_config_carries_pool_settings() {
        let settings = StorageSettings {
            backend: "pg".to_string(),
            database_url: Some("postgres://localhost/volunteers".to_string()),
            max_connections: 3,
            connect_timeout_secs: 7,
            run_migrations: false,
        };

        match settings.store_config().unwrap() {
            StoreConfig::Postgres(pg) => {
                assert_eq!(pg.max_connections, 3);
                assert_eq!(pg.connect_timeout_secs, 7);
                assert!(!pg.run_migrations);
            }
            StoreConfig::InMemory => panic!("Expected Postgres config"),
        }
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", valid());

        assert!(!rendered.contains("stats-password"));
        assert!(!rendered.contains("\"secret\""));
    }
}
