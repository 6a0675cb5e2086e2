//! Route definitions

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::server::AppState;

/// Build the gateway router: the health probe and the chat-completion
/// prefix are the only named routes; everything else falls through to
/// the generic relay.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/chat/*target", post(handlers::chat::chat_completions))
        .fallback(handlers::forward::forward_any)
        .with_state(state)
}
