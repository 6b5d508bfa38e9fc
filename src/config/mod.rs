//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, ConfigValidationError, HealthcheckConfig, LogFormat, LoggingConfig,
    ServerConfig, StatsConfig, StorageSettings,
};
