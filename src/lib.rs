//! Ferry - HTTP Forwarding Gateway
//!
//! Relays arbitrary inbound HTTP requests (including OpenAI-style chat
//! completions, streamed or not) to a caller-named target through a
//! rotating pool of public proxies, falling back to a direct connection
//! when every proxy attempt fails.
//!
//! ## Features
//!
//! - TTL-bounded proxy pool fetched from directory services
//! - Optional upfront liveness validation of candidates
//! - Exclusion-aware random rotation with bounded retries
//! - Header sanitization on both relay directions
//! - Buffered and chunk-streamed (SSE) response relay

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod relay;

pub use config::Config;
pub use error::{FerryError, Result};
