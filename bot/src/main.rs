use std::sync::Arc;

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;

mod indicators;
mod lock;
mod market;
mod optimizer;
mod services;
mod signal;
mod state;
mod store;
mod tracker;

use crate::lock::InstanceLock;
use crate::services::{keepalive, monitor::Monitor};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting TXF watch bot...");

    let app_state = Arc::new(AppState::new().await?);
    tracing::info!("AppState initialized");

    // Held for the lifetime of the process, released on clean shutdown.
    let _lock = InstanceLock::acquire(&app_state.config.lock_file)?;

    Migrator::up(&app_state.db, None).await?;
    tracing::info!("Migrations applied");

    if let Some(url) = app_state.config.keepalive_url.clone() {
        keepalive::spawn(url);
    }

    let monitor = Monitor::new(app_state.clone()).await?;
    tracing::info!("Bot is running and polling quotes...");
    monitor.run().await
}
