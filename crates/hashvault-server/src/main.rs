//! # hashvault-server
//!
//! Parses configuration, installs logging, opens the ledger and serves the
//! API until interrupted.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hashvault_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.log_json);

    let state = config.build_state().context("failed to build server state")?;
    let entries = state.vault.count().await.context("failed to read ledger")?;

    tracing::info!(
        bind = %config.bind,
        database = ?config.database,
        require_auth = state.require_auth,
        max_upload_bytes = state.vault.config().max_upload_bytes,
        extensions = config.allowed_extensions().len(),
        entries,
        "HashVault API starting"
    );

    let app = hashvault_server::app(state);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("HashVault API stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
