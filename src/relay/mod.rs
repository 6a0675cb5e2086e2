//! Request relay pipeline
//!
//! Header sanitization, outbound forwarding (buffered or streamed), and
//! the retry orchestration that ties them to the proxy pool.

pub mod forwarder;
pub mod headers;
pub mod orchestrator;

pub use forwarder::{ForwardSpec, Forwarder, RelayBody, RelayResult};
pub use orchestrator::RelayOrchestrator;
