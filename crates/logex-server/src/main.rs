//! logex - filtered log query API
//!
//! Serves the log filter routes over HTTP, backed by a search cluster or by
//! the in-memory reference engine.

use clap::Parser;
use logex_server::{Args, LogFormat, LogServer, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;

    match args.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init()?,
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("received SIGINT, shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = ServerConfig::try_from(&args)?;
    info!(
        listen = %config.bind_addr,
        backend = ?config.backend,
        es_addr = %config.search.address,
        "starting logex"
    );

    let server = LogServer::from_config(&config)?;
    server
        .serve_with_shutdown(config.bind_addr, shutdown_signal())
        .await?;
    Ok(())
}
