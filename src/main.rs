mod config;
mod game;
mod metrics;
mod net;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, Level};

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::net::transport::GameServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Light Cycle Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        anyhow::bail!("invalid configuration: {e}");
    }
    info!(
        "Configuration loaded: {}:{}, grid {}x{}, idle timeout {}s",
        config.bind_address,
        config.port,
        config.grid_width,
        config.grid_height,
        config.idle_timeout.as_secs()
    );

    // Initialize metrics
    let metrics = Arc::new(Metrics::new());

    let server = GameServer::new(config.clone(), metrics.clone());
    let manager = server.manager();

    // Periodic stats log
    let stats_metrics = metrics.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mgr = manager.read().await;
            info!(
                "stats: {} arenas, {} sessions, tick mean {}us max {}us, up {}s",
                mgr.arena_count(),
                mgr.session_count().await,
                stats_metrics.tick_mean_us(),
                stats_metrics.tick_max_us(),
                stats_metrics.uptime().as_secs()
            );
        }
    });

    info!("Server ready on {}:{}", config.bind_address, config.port);
    info!("Connect with: nc {} {}", config.bind_address, config.port);

    // Shutdown signal handler
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
        info!("Shutdown signal received");
    };

    // Run server with graceful shutdown
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    info!("Server stopped");

    Ok(())
}
