//! Chancery - community-management bot for a law-firm Discord server.
//!
//! Tickets with case numbers, billing with payment review, contract
//! e-signature, and corporate-structure provisioning, persisted to a
//! single JSON store.

mod common;
mod config;
mod contracts;
mod discord;
mod store;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{error, info};

use config::env::get_config_path;
use config::load_and_validate;
use discord::{build_client, AppState};
use store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Chancery v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);
    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See chancery.example.conf for reference.");
        e
    })?;
    info!("Configuration loaded successfully");
    info!("  Store: {}", config.storage.path);
    info!("  Contracts: {}", config.contracts.dir);
    info!(
        "  Commands: {}",
        match config.discord.guild_id {
            Some(guild) => format!("guild-scoped ({})", guild),
            None => "global".to_string(),
        }
    );

    let store = Store::open(&config.storage.path).map_err(|e| {
        error!("Failed to open store at {}: {}", config.storage.path, e);
        e
    })?;
    let state = Arc::new(AppState::new(config, Arc::new(Mutex::new(store))));

    let mut client = build_client(state).await?;

    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received - closing gateway...");
            client.shard_manager.shutdown_all().await;
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
