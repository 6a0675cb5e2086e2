//! Proxy pool: directory fetching, liveness probing, the TTL-bounded
//! snapshot cache, and exclusion-aware selection.

pub mod cache;
pub mod directory;
pub mod probe;
pub mod select;

pub use cache::{PoolMode, ProxyPool};
pub use directory::{HttpProxyDirectory, ProxyDirectory};
pub use probe::{HttpLivenessProbe, LivenessProbe};
pub use select::select_random;
