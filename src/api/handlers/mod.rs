pub mod chat;
pub mod forward;
pub mod health;

use axum::body::Body;
use axum::response::Response;

use crate::relay::{RelayBody, RelayResult};

/// Convert a relay result into an axum response. Headers were already
/// sanitized by the orchestrator, so the transport re-frames the body
/// itself (exact content length when buffered, chunked when streamed).
pub(crate) fn relay_response(result: RelayResult) -> Response {
    let body = match result.body {
        RelayBody::Buffered(bytes) => Body::from(bytes),
        RelayBody::Stream(stream) => Body::from_stream(stream),
    };

    let mut response = Response::new(body);
    *response.status_mut() = result.status;
    *response.headers_mut() = result.headers;
    response
}
