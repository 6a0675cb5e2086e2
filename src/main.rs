//! Ferry Gateway - Entry Point
//!
//! Starts the forwarding gateway with graceful shutdown support.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod models;
mod pool;
mod relay;

use api::{ApiServer, AppState};
use config::Config;
use pool::{HttpLivenessProbe, HttpProxyDirectory, LivenessProbe, ProxyPool};
use relay::RelayOrchestrator;

#[tokio::main]
async fn main() -> error::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ferry Gateway");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    // Build the proxy pool
    let directory = Arc::new(HttpProxyDirectory::new(config.pool.endpoints.clone()));
    let ttl = Duration::from_secs(config.pool.cache_ttl);
    let pool = if config.pool.validate {
        let probe: Arc<dyn LivenessProbe> = Arc::new(HttpLivenessProbe::new(
            config.pool.probe_url.clone(),
            Duration::from_secs(config.pool.probe_timeout),
        ));
        Arc::new(ProxyPool::with_probe(directory, probe, ttl))
    } else {
        Arc::new(ProxyPool::new(directory, ttl))
    };
    info!(
        "Proxy pool in {} mode, {} directory endpoint(s), TTL {}s",
        pool.mode().as_str(),
        config.pool.endpoints.len(),
        config.pool.cache_ttl
    );

    // Build the relay core and the server
    let orchestrator = Arc::new(RelayOrchestrator::new(pool.clone(), config.relay.max_retries));
    let state = AppState::new(pool, orchestrator, &config.relay);
    let server = ApiServer::new(config.server.clone(), state);

    // Run until a shutdown signal arrives
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(shutdown_rx).await {
            error!("Gateway server error: {}", e);
        }
    });

    info!("Gateway started on {}", config.listen_addr());

    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = server_task.await;

    info!("Ferry Gateway stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
