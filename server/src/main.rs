//! Listkeeper HTTP server.
//!
//! Loads the list, serves it over HTTP and saves it on shutdown.
//!
//! Run with: `cargo run --bin listkeeper-server`
//!
//! Configuration comes from the environment (a `.env` file is read if
//! present); see [`config`] for the variables.

mod config;

use anyhow::Context;
use config::ServerConfig;
use listkeeper_runtime::metrics::MetricsRecorder;
use listkeeper_runtime::{JsonFileCodec, Sequencer, SequencerHandle};
use listkeeper_web::{AppState, router};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = ServerConfig::from_env()?;
    info!(
        addr = %config.addr,
        data_file = %config.data_file.display(),
        channel_capacity = config.sequencer.channel_capacity,
        metrics = config.metrics_enabled,
        "Starting listkeeper"
    );

    let metrics = if config.metrics_enabled {
        MetricsRecorder::install()?.handle().cloned()
    } else {
        None
    };

    let sequencer = Sequencer::start(
        JsonFileCodec::new(&config.data_file),
        config.sequencer.clone(),
    )
    .await
    .with_context(|| format!("could not load {}", config.data_file.display()))?;

    let mut state = AppState::new(sequencer.clone());
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("could not bind {}", config.addr))?;
    info!(addr = %config.addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, saving list");
    save_on_exit(&sequencer, config.shutdown_timeout).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "listkeeper_server=info,listkeeper_runtime=info,listkeeper_web=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Sends `Shutdown` and waits, at most `limit`, for the final save.
async fn save_on_exit(sequencer: &SequencerHandle, limit: Duration) -> anyhow::Result<()> {
    let shutdown = sequencer.clone().without_timeout();

    match tokio::time::timeout(limit, shutdown.shutdown()).await {
        Ok(Ok(())) => {
            info!("List saved, shutdown complete");
            Ok(())
        }
        Ok(Err(err)) => {
            error!(error = %err, "Final save failed");
            Err(err).context("final save failed")
        }
        Err(_) => {
            error!(timeout = ?limit, "Timed out waiting for the final save");
            anyhow::bail!("final save did not finish within {limit:?}")
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
