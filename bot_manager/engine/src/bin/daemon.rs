//! Bot manager daemon
//!
//! Loads bot definitions, runs the reconciliation and status broadcast loops,
//! and stops every bot on SIGINT/SIGTERM.

#[path = "daemon/config.rs"]
mod config;

use anyhow::Context;
use bm_engine::application::Application;
use bm_engine::domain::LoadConfigCommand;
use bm_engine::infrastructure::get_default_config_path;
use config::DaemonConfig;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DaemonConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid daemon configuration")?;

    info!(
        reconcile_interval_ms = config.reconcile_interval.as_millis() as u64,
        broadcast_interval_ms = config.broadcast_interval.as_millis() as u64,
        stop_grace_ms = config.stop_grace.as_millis() as u64,
        "Starting bot manager daemon"
    );

    run(config).await
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    let app = Application::new(config.supervisor_settings());

    match config.config_file.clone().or_else(get_default_config_path) {
        Some(path) => {
            let mut command = LoadConfigCommand::new(path.clone());
            command.auto_start = config.auto_start;
            let response = app
                .load_config()
                .execute(command)
                .await
                .with_context(|| format!("Failed to load bot configuration from {}", path))?;
            for error in &response.errors {
                warn!(error = %error, "Configuration error");
            }
        }
        None => info!("No bot configuration found, starting empty"),
    }

    let token = CancellationToken::new();
    let mut loops = JoinSet::new();

    let reconciliation = app.reconciliation_service(config.reconcile_interval);
    let reconcile_token = token.clone();
    loops.spawn(async move { reconciliation.run(reconcile_token).await });

    let status_broadcast = app.status_broadcast_service(config.broadcast_interval);
    let broadcast_token = token.clone();
    loops.spawn(async move { status_broadcast.run(broadcast_token).await });

    // No transport is attached; mirror the event stream into the debug log
    let mut events = app.subscribe("daemon-log");
    let events_token = token.clone();
    loops.spawn(async move {
        loop {
            tokio::select! {
                _ = events_token.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => match serde_json::to_string(event.as_ref()) {
                        Ok(json) => debug!(kind = event.kind(), event = %json, "Bot event"),
                        Err(e) => warn!(error = %e, "Failed to serialize bot event"),
                    },
                    None => break,
                },
            }
        }
    });

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
    }

    token.cancel();
    while loops.join_next().await.is_some() {}

    let stopped = app.supervisor().stop_all().await;
    info!(stopped = stopped, "All bots stopped, exiting");
    Ok(())
}
