//! Stats command - polls the member-count endpoint of a running instance

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use serde_json::{json, Map, Value};
use tokio::fs::OpenOptions;
use tokio::io::{self, AsyncWriteExt};

const MEMBER_COUNT_PATH: &str = "/v1/stats/teams/member-count";
const OUTPUT_KEY: &str = "teams.member_count";

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Base URL of the API, e.g. http://localhost:8888
    pub base_url: String,

    /// Append the stats line to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Basic auth username, defaults to stats.username from the configuration
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password, defaults to stats.password from the configuration
    #[arg(long)]
    pub password: Option<String>,
}

pub async fn run(args: StatsArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let username = args.username.unwrap_or(config.stats.username);
    let password = args.password.unwrap_or(config.stats.password);

    let counts = fetch_member_counts(&args.base_url, &username, &password).await?;
    let line = stats_line(counts)?;

    match args.out {
        Some(path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .with_context(|| format!("Failed to open output file {}", path.display()))?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

fn member_count_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), MEMBER_COUNT_PATH)
}

async fn fetch_member_counts(
    base_url: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<Map<String, Value>> {
    let url = member_count_url(base_url);

    let response = reqwest::Client::new()
        .get(&url)
        .basic_auth(username, Some(password))
        .send()
        .await
        .with_context(|| format!("Failed to call {}", url))?;

    if response.status() != reqwest::StatusCode::OK {
        bail!("Unexpected status code returned: {}", response.status().as_u16());
    }

    response
        .json()
        .await
        .context("Failed to decode response body")
}

/// One newline-terminated JSON object keyed by `teams.member_count`
fn stats_line(counts: Map<String, Value>) -> anyhow::Result<String> {
    let mut line = serde_json::to_string(&json!({ OUTPUT_KEY: counts }))?;
    line.push('\n');
    Ok(line)
}
