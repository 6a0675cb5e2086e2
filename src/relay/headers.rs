//! Header sanitization for both relay directions
//!
//! Outbound: strip hop-by-hop and host-identifying headers so the
//! target never sees who the gateway is fronting for. Inbound: strip
//! transport-framing headers (the gateway re-frames the body itself)
//! and any upstream CORS headers, then inject a fixed permissive CORS
//! set. Filtering always precedes injection so injected headers are
//! never stripped.

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

/// Headers never forwarded to the target.
const REQUEST_DENYLIST: &[&str] = &[
    "host",
    "origin",
    "referer",
    "x-real-ip",
    "connection",
    "accept-encoding",
];

/// Transport-framing headers never relayed back to the caller.
const RESPONSE_DENYLIST: &[&str] = &[
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
];

fn is_request_denied(name: &HeaderName) -> bool {
    let name = name.as_str();
    REQUEST_DENYLIST.contains(&name) || name.starts_with("x-forwarded-")
}

fn is_response_denied(name: &HeaderName) -> bool {
    let name = name.as_str();
    RESPONSE_DENYLIST.contains(&name) || name.starts_with("access-control-")
}

/// Produce the outbound header set from the inbound headers.
///
/// Duplicate values of a kept header are preserved in order. Header
/// names compare case-insensitively (`HeaderName` is lowercase by
/// construction).
pub fn sanitize_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if !is_request_denied(name) {
            outbound.append(name.clone(), value.clone());
        }
    }
    outbound
}

/// Produce the caller-safe header set from the upstream response
/// headers: framing and upstream CORS headers removed, permissive CORS
/// appended.
pub fn sanitize_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut inbound = HeaderMap::with_capacity(upstream.len() + 4);
    for (name, value) in upstream {
        if !is_response_denied(name) {
            inbound.append(name.clone(), value.clone());
        }
    }

    inbound.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    inbound.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS"),
    );
    inbound.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    inbound.insert(
        HeaderName::from_static("access-control-expose-headers"),
        HeaderValue::from_static("*"),
    );

    inbound
}

/// Inject `content-type: application/json` when no content type
/// survived sanitization. Used by the chat-completion path, which
/// always relays a JSON body.
pub fn ensure_json_content_type(headers: &mut HeaderMap) {
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
}
