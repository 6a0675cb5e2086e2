//! Proxy directory client
//!
//! Fetches candidate proxies from one or more HTTP directory endpoints.
//! Every per-endpoint failure (network, non-200, malformed JSON) is
//! swallowed and logged; a failed endpoint simply contributes zero
//! proxies.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FerryError;
use crate::models::Proxy;

/// Response shape shared by the supported directory services:
/// `{"data": [proxy, ...]}`.
#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Source of candidate proxies.
///
/// Infallible by contract: implementations degrade to an empty list
/// rather than erroring, so the pool never propagates fetch failures.
#[async_trait]
pub trait ProxyDirectory: Send + Sync {
    async fn fetch(&self) -> Vec<Proxy>;
}

/// Directory client backed by HTTP endpoints.
pub struct HttpProxyDirectory {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl HttpProxyDirectory {
    const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(endpoints: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Self::FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, endpoints }
    }

    async fn fetch_endpoint(&self, endpoint: &str) -> Result<Vec<Proxy>, FerryError> {
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| FerryError::DirectoryFetch(format!("{} unreachable: {}", endpoint, e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FerryError::DirectoryFetch(format!(
                "{} returned status {}",
                endpoint,
                response.status()
            )));
        }

        let parsed: DirectoryResponse = response.json().await.map_err(|e| {
            FerryError::DirectoryFetch(format!("{} returned malformed JSON: {}", endpoint, e))
        })?;

        // Entries are decoded individually so one malformed record does
        // not discard the rest of the feed.
        let total = parsed.data.len();
        let proxies: Vec<Proxy> = parsed
            .data
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        debug!(
            "Directory endpoint {} yielded {}/{} usable entries",
            endpoint,
            proxies.len(),
            total
        );

        Ok(proxies)
    }
}

#[async_trait]
impl ProxyDirectory for HttpProxyDirectory {
    async fn fetch(&self) -> Vec<Proxy> {
        let mut all = Vec::new();
        for endpoint in &self.endpoints {
            // A failed endpoint contributes zero proxies, never an error.
            match self.fetch_endpoint(endpoint).await {
                Ok(proxies) => all.extend(proxies),
                Err(e) => warn!("{}", e),
            }
        }
        all
    }
}
