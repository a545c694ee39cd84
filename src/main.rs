use std::net::SocketAddr;
use std::sync::Arc;

use catalog_sync::errors::AppError;
use catalog_sync::inventory::Store;
use catalog_sync::service::{Group, Service};
use catalog_sync::{config, frontend, service, updater, upstream};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Ingests product catalogs and manufacturer availability from an upstream
/// API, joins them in an in-memory store, and serves the result by category.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync", version, about)]
struct Cli {
    /// Optional config file (without extension), overriding env-only config.
    #[arg(long)]
    config: Option<String>,

    /// Write a CPU profile to this path. Accepted for interface
    /// compatibility; profiling itself is not implemented.
    #[arg(long)]
    cpuprofile: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!(%err, "exiting due to error");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let cfg = config::load_config(cli.config.as_deref())?;
    config::init_tracing(&cfg.log_level);

    if cli.cpuprofile.is_some() {
        warn!("cpu profiling was requested but is not implemented");
    }

    info!(start_time = %chrono::Utc::now(), "starting app");

    let store = Store::new();
    let client = upstream::Client::new(cfg.base_url.clone(), cfg.http_timeout(), cfg.hedge_width);

    let updater = Arc::new(updater::Updater::new(
        client,
        store.clone(),
        cfg.categories.clone(),
        cfg.manufacturers.clone(),
        cfg.workers,
        cfg.update_interval(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let frontend = Arc::new(frontend::Frontend::new(addr, store));

    let group = Group::new(vec![
        updater as Arc<dyn Service>,
        frontend as Arc<dyn Service>,
    ]);

    let token = CancellationToken::new();
    let shutdown_token = token.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutting down due to signal");
        shutdown_token.cancel();
    });

    group.run(token).await?;
    info!(exit_time = %chrono::Utc::now(), "stopping catalog-sync");
    Ok(())
}

/// Waits for SIGINT or (on Unix) SIGHUP.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sighup.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
