//! Gateway server using Axum

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::{RelayConfig, ServerConfig};
use crate::error::{FerryError, Result};
use crate::pool::ProxyPool;
use crate::relay::RelayOrchestrator;

use super::routes;

/// Shared state for the handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ProxyPool>,
    pub orchestrator: Arc<RelayOrchestrator>,
    pub forward_timeout: Duration,
    pub chat_timeout: Duration,
}

impl AppState {
    pub fn new(pool: Arc<ProxyPool>, orchestrator: Arc<RelayOrchestrator>, relay: &RelayConfig) -> Self {
        Self {
            pool,
            orchestrator,
            forward_timeout: Duration::from_secs(relay.forward_timeout),
            chat_timeout: Duration::from_secs(relay.chat_timeout),
        }
    }
}

/// Gateway HTTP server
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    fn build_router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal flips.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                FerryError::InvalidConfig(format!(
                    "invalid listen address {}:{}",
                    self.config.host, self.config.port
                ))
            })?;

        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Gateway listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| FerryError::Internal(e.to_string()))?;

        info!("Gateway shut down");
        Ok(())
    }
}
