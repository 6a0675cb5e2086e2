//! Catch-all relay handler
//!
//! Any method on any unrecognized path is forwarded: the path (minus
//! its leading slash, with an optional scheme prefix) names the target,
//! the raw query string and body bytes pass through verbatim. Large
//! responses are relayed chunk-for-chunk to bound memory.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::api::handlers::relay_response;
use crate::api::server::AppState;
use crate::error::FerryError;
use crate::relay::forwarder::{normalize_target, ForwardSpec};
use crate::relay::headers::sanitize_request_headers;

pub async fn forward_any(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let target = parts.uri.path().trim_start_matches('/');
    if target.is_empty() {
        return FerryError::InvalidTarget("no target host in path".to_string()).into_response();
    }
    let target_url = normalize_target(target);

    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return FerryError::InvalidPayload(format!("failed to read request body: {}", e))
                .into_response()
        }
    };

    let spec = ForwardSpec {
        method: parts.method,
        target_url,
        headers: sanitize_request_headers(&parts.headers),
        body: (!body_bytes.is_empty()).then(|| Bytes::from(body_bytes)),
        query: parts.uri.query().map(str::to_string),
        via: None,
        timeout: state.forward_timeout,
        stream: true,
    };

    match state.orchestrator.relay(spec).await {
        Ok(result) => relay_response(result),
        Err(e) => e.into_response(),
    }
}
