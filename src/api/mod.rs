//! Inbound HTTP surface
//!
//! Routing, handlers, and the axum server that fronts the relay core.

pub mod handlers;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};
