//! Outbound request forwarding
//!
//! Builds and executes a single outbound attempt, through a proxy or
//! directly, and exposes the upstream response either fully buffered or
//! as a lazy chunk stream.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use http::{HeaderMap, Method, StatusCode};
use tracing::debug;

use crate::error::{FerryError, Result};
use crate::models::Proxy;

/// One outbound attempt, constructed per retry from the inbound request
/// plus the currently selected proxy (or none for the direct fallback).
#[derive(Debug, Clone)]
pub struct ForwardSpec {
    pub method: Method,
    pub target_url: String,
    /// Already-sanitized outbound headers.
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Raw query string, forwarded verbatim.
    pub query: Option<String>,
    pub via: Option<Proxy>,
    pub timeout: Duration,
    /// When set, the response body is relayed as a lazy chunk stream
    /// instead of being buffered.
    pub stream: bool,
}

impl ForwardSpec {
    /// The full outbound URL including the relayed query string.
    pub fn url(&self) -> String {
        match self.query.as_deref() {
            Some(q) if !q.is_empty() => format!("{}?{}", self.target_url, q),
            _ => self.target_url.clone(),
        }
    }

    /// Replace the proxy for the next attempt.
    pub fn via(mut self, proxy: Option<Proxy>) -> Self {
        self.via = proxy;
        self
    }
}

/// Upstream response body, buffered or lazily streamed.
///
/// The streamed form is finite and non-restartable; dropping it aborts
/// the upstream read and releases the connection.
pub enum RelayBody {
    Buffered(Bytes),
    Stream(BoxStream<'static, reqwest::Result<Bytes>>),
}

impl fmt::Debug for RelayBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayBody::Buffered(bytes) => f.debug_tuple("Buffered").field(bytes).finish(),
            RelayBody::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// Relayed upstream response: status and body pass through exactly,
/// headers are sanitized by the orchestrator on the way out.
#[derive(Debug)]
pub struct RelayResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: RelayBody,
}

/// Default the scheme to `https` when the caller supplied a bare host.
pub fn normalize_target(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

/// Executes outbound attempts.
#[derive(Debug, Default, Clone)]
pub struct Forwarder;

impl Forwarder {
    pub fn new() -> Self {
        Self
    }

    /// Issue one outbound call per `spec`.
    ///
    /// Any response from the upstream, whatever its status, is a
    /// success; only transport-level failures return an error, typed by
    /// whether a proxy was in the path.
    pub async fn forward(&self, spec: ForwardSpec) -> Result<RelayResult> {
        let client = self.build_client(&spec)?;
        let url = spec.url();

        debug!(
            "Forwarding {} {} via {}",
            spec.method,
            url,
            spec.via
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "direct".to_string())
        );

        let mut request = client
            .request(spec.method.clone(), &url)
            .headers(spec.headers.clone());
        if let Some(body) = spec.body.clone() {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| attempt_error(&spec, e))?;

        let status = response.status();
        let headers = response.headers().clone();

        let body = if spec.stream {
            RelayBody::Stream(response.bytes_stream().boxed())
        } else {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| attempt_error(&spec, e))?;
            RelayBody::Buffered(bytes)
        };

        Ok(RelayResult {
            status,
            headers,
            body,
        })
    }

    // One client per attempt: the proxy differs between attempts, and
    // reqwest fixes the proxy at client construction.
    fn build_client(&self, spec: &ForwardSpec) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            // The gateway deliberately does not validate upstream
            // certificates; public rotating proxies break TLS chains.
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(spec.timeout);

        if let Some(proxy) = &spec.via {
            let upstream = reqwest::Proxy::all(proxy.url()).map_err(|e| {
                FerryError::ProxyConnect {
                    proxy: proxy.to_string(),
                    message: format!("unusable proxy URL: {}", e),
                }
            })?;
            builder = builder.proxy(upstream);
        }

        builder
            .build()
            .map_err(|e| FerryError::Internal(format!("client build failed: {}", e)))
    }
}

fn attempt_error(spec: &ForwardSpec, cause: reqwest::Error) -> FerryError {
    match &spec.via {
        Some(proxy) => FerryError::ProxyConnect {
            proxy: proxy.to_string(),
            message: cause.to_string(),
        },
        None => FerryError::DirectConnect(cause.to_string()),
    }
}
