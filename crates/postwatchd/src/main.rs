//! postwatch collector daemon
//!
//! Axum HTTP server in front of the append-only report history store.

use std::sync::Arc;

use color_eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use postwatch_store::HistoryStore;
use postwatchd::config::Config;
use postwatchd::router::create_router;
use postwatchd::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_default()?;

    if let Some(parent) = config.daemon.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = HistoryStore::open(&config.daemon.db_path)?;
    info!(db = %config.daemon.db_path.display(), "history store opened");

    let state = Arc::new(AppState::new(store, config.clone()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.daemon.bind.as_str()).await?;
    info!(addr = %listener.local_addr()?, "collector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
