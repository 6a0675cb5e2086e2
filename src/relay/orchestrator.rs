//! Retry orchestration
//!
//! Per inbound request: up to `max_retries` attempts through distinct
//! proxies from the current pool snapshot, then exactly one direct
//! attempt. Per-proxy failures are absorbed and only steer which proxy
//! is tried next; the terminal error carries both the last proxy error
//! and the direct-connection error.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{FerryError, Result};
use crate::pool::{select_random, ProxyPool};
use crate::relay::forwarder::{ForwardSpec, Forwarder, RelayResult};
use crate::relay::headers::sanitize_response_headers;

/// Ties the pool, selection, and forwarding together.
pub struct RelayOrchestrator {
    pool: Arc<ProxyPool>,
    forwarder: Forwarder,
    max_retries: u32,
}

impl RelayOrchestrator {
    pub fn new(pool: Arc<ProxyPool>, max_retries: u32) -> Self {
        Self {
            pool,
            forwarder: Forwarder::new(),
            max_retries,
        }
    }

    /// Relay one request. On success the upstream status and body pass
    /// through unchanged; response headers are sanitized. Retries are
    /// bounded by attempt count, not wall clock: a slow failing proxy
    /// burns its full timeout.
    #[instrument(skip(self, spec), fields(method = %spec.method, target = %spec.target_url))]
    pub async fn relay(&self, spec: ForwardSpec) -> Result<RelayResult> {
        let mut excluded: HashSet<usize> = HashSet::new();
        let mut last_proxy_error: Option<FerryError> = None;

        for attempt in 0..self.max_retries {
            let snapshot = self.pool.snapshot().await;
            let Some((proxy, index)) = select_random(&snapshot, &excluded) else {
                debug!(
                    "Pool exhausted after {} attempts ({} proxies); falling back to direct",
                    attempt,
                    snapshot.len()
                );
                break;
            };
            let proxy = proxy.clone();
            excluded.insert(index);

            debug!(
                "Attempt {}/{} via proxy {}",
                attempt + 1,
                self.max_retries,
                proxy
            );

            match self.forwarder.forward(spec.clone().via(Some(proxy.clone()))).await {
                Ok(result) => return Ok(finish(result)),
                Err(e) => {
                    warn!(
                        "Attempt {}/{} via {} failed: {}",
                        attempt + 1,
                        self.max_retries,
                        proxy,
                        e
                    );
                    last_proxy_error = Some(e);
                }
            }
        }

        debug!("Falling back to direct connection");

        match self.forwarder.forward(spec.clone().via(None)).await {
            Ok(result) => Ok(finish(result)),
            Err(direct) => {
                let direct_error = match direct {
                    FerryError::DirectConnect(message) => message,
                    other => other.to_string(),
                };
                Err(FerryError::AttemptsExhausted {
                    target_url: spec.target_url,
                    last_proxy_error: last_proxy_error.map(|e| e.to_string()),
                    direct_error,
                })
            }
        }
    }
}

fn finish(mut result: RelayResult) -> RelayResult {
    result.headers = sanitize_response_headers(&result.headers);
    result
}
