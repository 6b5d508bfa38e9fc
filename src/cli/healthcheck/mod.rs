//! Healthcheck command - probes the loopback healthcheck listener
//!
//! Meant as a container probe: prints `SUCCESS` and exits zero only on 200.

use std::time::Duration;

use anyhow::{bail, Context};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;

    probe(&format!("http://127.0.0.1:{}/", config.healthcheck.port)).await?;

    println!("SUCCESS");
    Ok(())
}

/// GET `url`, failing on transport errors and any status other than 200
pub async fn probe(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Healthcheck request to {} failed", url))?;

    if response.status() != reqwest::StatusCode::OK {
        bail!("Healthcheck returned status {}", response.status());
    }

    Ok(())
}
