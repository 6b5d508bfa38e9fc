//! Serve command - runs the API and the healthcheck listener

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::{create_health_router, create_router, AppState};
use crate::config::{AppConfig, HealthcheckConfig};
use crate::infrastructure::logging;
use crate::infrastructure::store::StoreFactory;

/// Run the API server until SIGINT or SIGTERM
pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    logging::init_logging(&config.logging)?;
    config.validate()?;

    let store = StoreFactory::create(&config.storage.store_config()?).await?;

    let shutdown = CancellationToken::new();
    let state = crate::create_app_state(&config, store, shutdown.clone());

    spawn_healthcheck_server(&config.healthcheck, state.clone(), shutdown.clone()).await?;

    let app = create_router(state, request_timeout(&config));

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to listen on {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!(address = %listener.local_addr()?, "API server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("API server shutdown complete");
    Ok(())
}

fn request_timeout(config: &AppConfig) -> Option<Duration> {
    match config.server.request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

/// Serve the healthcheck on the loopback interface in the background
async fn spawn_healthcheck_server(
    config: &HealthcheckConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", config.port))
        .await
        .with_context(|| format!("Failed to listen on healthcheck port {}", config.port))?;
    info!(port = config.port, "Healthcheck server starting");

    let app = create_health_router(state);
    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await;

        if let Err(e) = result {
            error!(error = %e, "Healthcheck server failed");
        }
    });

    Ok(())
}

/// Resolves on SIGINT or SIGTERM after cancelling `shutdown`
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    shutdown.cancel();
}
