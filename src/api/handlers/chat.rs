//! Chat-completion relay handler
//!
//! `POST /chat/{target}` relays an OpenAI-style chat-completion call:
//! the body must be JSON (checked before any outbound call), the fixed
//! completions suffix is appended to the target, and a `stream: true`
//! flag switches to event-stream passthrough.

use axum::extract::{Path, RawQuery, State};
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use http::HeaderMap;
use tracing::debug;

use crate::api::handlers::relay_response;
use crate::api::server::AppState;
use crate::error::FerryError;
use crate::relay::forwarder::{normalize_target, ForwardSpec};
use crate::relay::headers::{ensure_json_content_type, sanitize_request_headers};

/// Fixed suffix appended to the caller-named target host.
pub const CHAT_COMPLETIONS_SUFFIX: &str = "/v1/chat/completions";

pub async fn chat_completions(
    State(state): State<AppState>,
    Path(target): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Reject malformed JSON before any outbound work.
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return chat_error(FerryError::InvalidPayload(format!(
                "request body is not valid JSON: {}",
                e
            )))
        }
    };

    let stream = payload
        .get("stream")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    let target_url = format!(
        "{}{}",
        normalize_target(target.trim_end_matches('/')),
        CHAT_COMPLETIONS_SUFFIX
    );
    debug!("Chat completion for {} (stream: {})", target_url, stream);

    let mut outbound_headers = sanitize_request_headers(&headers);
    ensure_json_content_type(&mut outbound_headers);

    let spec = ForwardSpec {
        method: Method::POST,
        target_url,
        headers: outbound_headers,
        body: Some(body),
        query,
        via: None,
        // Generation is slow; chat completions get the long timeout.
        timeout: state.chat_timeout,
        stream,
    };

    match state.orchestrator.relay(spec).await {
        Ok(result) => {
            let mut response = relay_response(result);
            if stream {
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
            }
            response
        }
        Err(e) => chat_error(e),
    }
}

/// Error responses on the chat path nest under `error.message/type`.
fn chat_error(e: FerryError) -> Response {
    let status: StatusCode = e.status_code();
    (status, Json(e.chat_body())).into_response()
}
