//! Proxy liveness probing
//!
//! A single upfront check per candidate: fetch a well-known echo-IP
//! endpoint through the proxy and require a 200. Used only in
//! validation mode; rotation mode trusts the directory feed.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::models::Proxy;

/// Liveness check for a candidate proxy.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_live(&self, proxy: &Proxy) -> bool;
}

/// Probes candidates by issuing a GET through them to a test endpoint.
pub struct HttpLivenessProbe {
    test_url: String,
    timeout: Duration,
}

impl HttpLivenessProbe {
    pub fn new(test_url: String, timeout: Duration) -> Self {
        Self { test_url, timeout }
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn is_live(&self, proxy: &Proxy) -> bool {
        let upstream = match reqwest::Proxy::all(proxy.url()) {
            Ok(p) => p,
            Err(e) => {
                debug!("Proxy {} has an unusable URL: {}", proxy, e);
                return false;
            }
        };

        // Public proxies routinely present self-signed certificates;
        // the probe only asserts reachability.
        let client = match reqwest::Client::builder()
            .proxy(upstream)
            .danger_accept_invalid_certs(true)
            .timeout(self.timeout)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                debug!("Probe client build failed for {}: {}", proxy, e);
                return false;
            }
        };

        match client.get(&self.test_url).send().await {
            Ok(response) => {
                let live = response.status() == reqwest::StatusCode::OK;
                debug!(
                    "Probe of {} via {}: status {}",
                    self.test_url,
                    proxy,
                    response.status()
                );
                live
            }
            Err(e) => {
                debug!("Probe of {} via {} failed: {}", self.test_url, proxy, e);
                false
            }
        }
    }
}
