//! Health check endpoint

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;

/// Reports pool availability without forwarding anything. Reading the
/// pool through the normal path keeps the cache warm: a stale snapshot
/// refreshes on a health poll.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.pool.snapshot().await;

    Json(json!({
        "status": "ok",
        "proxies_available": snapshot.len(),
        "cache_age_seconds": state.pool.age().map(|age| age.as_secs()),
    }))
}
