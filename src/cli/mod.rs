//! CLI module
//!
//! Subcommands:
//! - `serve`: run the API and the loopback healthcheck listener
//! - `migrate`: apply pending PostgreSQL schema migrations
//! - `healthcheck`: probe the local healthcheck listener
//! - `stats`: fetch team member counts from a running instance

pub mod healthcheck;
pub mod migrate;
pub mod serve;
pub mod stats;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Volunteer teams service
#[derive(Parser)]
#[command(name = "volunteer-teams")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending database migrations
    Migrate,

    /// Call the local healthcheck endpoint, printing SUCCESS when healthy
    #[command(alias = "hc")]
    Healthcheck,

    /// Fetch team member counts and emit them as a JSON line
    Stats(stats::StatsArgs),
}

/// Load `.env` and the layered configuration
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
