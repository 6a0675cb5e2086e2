use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the Ferry gateway
#[derive(Error, Debug)]
pub enum FerryError {
    // Pool errors (absorbed inside the pool, never surfaced to callers)
    #[error("Directory fetch failed: {0}")]
    DirectoryFetch(String),

    // Per-attempt relay errors
    #[error("Proxy connection failed via {proxy}: {message}")]
    ProxyConnect { proxy: String, message: String },

    #[error("Direct connection failed: {0}")]
    DirectConnect(String),

    // Terminal relay failure: every proxy attempt plus the direct
    // fallback failed for this request.
    #[error("All proxy attempts failed and direct connection failed: {direct_error}")]
    AttemptsExhausted {
        target_url: String,
        last_proxy_error: Option<String>,
        direct_error: String,
    },

    // Request errors
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid target URL: {0}")]
    InvalidTarget(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Ferry operations
pub type Result<T> = std::result::Result<T, FerryError>;

impl FerryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            FerryError::InvalidPayload(_)
            | FerryError::InvalidTarget(_)
            | FerryError::InvalidConfig(_) => StatusCode::BAD_REQUEST,

            // 502 Bad Gateway
            FerryError::ProxyConnect { .. }
            | FerryError::DirectConnect(_)
            | FerryError::AttemptsExhausted { .. } => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            FerryError::DirectoryFetch(_) | FerryError::Io(_) | FerryError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// JSON body for the generic relay path.
    ///
    /// The terminal relay failure exposes the last proxy error and the
    /// direct-connection error so a failed request stays diagnosable.
    pub fn body(&self) -> serde_json::Value {
        match self {
            FerryError::AttemptsExhausted {
                target_url,
                last_proxy_error,
                ..
            } => json!({
                "error": self.to_string(),
                "last_error": last_proxy_error,
                "target_url": target_url,
            }),
            other => json!({ "error": other.to_string() }),
        }
    }

    /// JSON body for the chat-completion path (OpenAI-style nesting).
    pub fn chat_body(&self) -> serde_json::Value {
        match self {
            FerryError::AttemptsExhausted {
                target_url,
                last_proxy_error,
                ..
            } => json!({
                "error": {
                    "message": self.to_string(),
                    "type": "gateway_error",
                    "last_error": last_proxy_error,
                    "target_url": target_url,
                }
            }),
            other => json!({
                "error": {
                    "message": other.to_string(),
                    "type": if other.is_client_error() { "invalid_request_error" } else { "gateway_error" },
                }
            }),
        }
    }
}

// Implement IntoResponse for handler error responses
impl IntoResponse for FerryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.body())).into_response()
    }
}
