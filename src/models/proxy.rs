//! Proxy pool value types
//!
//! `Proxy` mirrors the directory-feed JSON; `PoolSnapshot` is the
//! immutable, timestamped pool served to readers between refreshes.

use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};

/// A candidate upstream proxy as advertised by the directory service.
///
/// Immutable once fetched; identity is `(ip, port)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    pub ip: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(rename = "upTime", default)]
    pub up_time: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub latency: f64,
}

impl Proxy {
    /// The proxy URL, using the first advertised protocol (lower-cased,
    /// defaulting to `http` when none is listed).
    pub fn url(&self) -> String {
        let protocol = self
            .protocols
            .first()
            .map(|p| p.to_lowercase())
            .unwrap_or_else(|| "http".to_string());
        format!("{}://{}:{}", protocol, self.ip, self.port)
    }

    /// Whether this proxy advertises plain HTTP or HTTPS forwarding.
    pub fn supports_http(&self) -> bool {
        self.protocols
            .iter()
            .any(|p| p.eq_ignore_ascii_case("http") || p.eq_ignore_ascii_case("https"))
    }

    /// Composite quality ordering: higher uptime first, then higher
    /// speed, then lower latency.
    pub fn quality_cmp(&self, other: &Proxy) -> Ordering {
        other
            .up_time
            .total_cmp(&self.up_time)
            .then(other.speed.total_cmp(&self.speed))
            .then(self.latency.total_cmp(&other.latency))
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

// Directory feeds are inconsistent about the port field: some send a
// JSON number, others a numeric string.
fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortField {
        Number(u16),
        Text(String),
    }

    match PortField::deserialize(deserializer)? {
        PortField::Number(n) => Ok(n),
        PortField::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// An immutable snapshot of the proxy pool.
///
/// Snapshots are replaced wholesale on refresh (never mutated in place)
/// so concurrent readers always observe a consistent list.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub proxies: Vec<Proxy>,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl PoolSnapshot {
    pub fn new(proxies: Vec<Proxy>, ttl: Duration) -> Self {
        Self {
            proxies,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    /// A fresh snapshot must be reused without a new directory fetch.
    pub fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(ip: &str, protocols: &[&str]) -> Proxy {
        Proxy {
            ip: ip.to_string(),
            port: 8080,
            protocols: protocols.iter().map(|p| p.to_string()).collect(),
            up_time: 0.0,
            speed: 0.0,
            latency: 0.0,
        }
    }

    #[test]
    fn test_proxy_url_uses_first_protocol_lowercased() {
        let p = proxy("10.0.0.1", &["HTTPS", "http"]);
        assert_eq!(p.url(), "https://10.0.0.1:8080");
    }

    #[test]
    fn test_proxy_url_defaults_to_http() {
        let p = proxy("10.0.0.1", &[]);
        assert_eq!(p.url(), "http://10.0.0.1:8080");
    }

    #[test]
    fn test_supports_http_filter() {
        assert!(proxy("10.0.0.1", &["http"]).supports_http());
        assert!(proxy("10.0.0.1", &["socks5", "HTTPS"]).supports_http());
        assert!(!proxy("10.0.0.1", &["socks4"]).supports_http());
        assert!(!proxy("10.0.0.1", &[]).supports_http());
    }

    #[test]
    fn test_port_accepts_number_or_string() {
        let from_number: Proxy =
            serde_json::from_str(r#"{"ip":"1.2.3.4","port":3128,"protocols":["http"]}"#).unwrap();
        assert_eq!(from_number.port, 3128);

        let from_string: Proxy =
            serde_json::from_str(r#"{"ip":"1.2.3.4","port":"3128","protocols":["http"]}"#).unwrap();
        assert_eq!(from_string.port, 3128);

        let garbage =
            serde_json::from_str::<Proxy>(r#"{"ip":"1.2.3.4","port":"none","protocols":[]}"#);
        assert!(garbage.is_err());
    }

    #[test]
    fn test_uptime_field_is_camel_case() {
        let p: Proxy = serde_json::from_str(
            r#"{"ip":"1.2.3.4","port":80,"protocols":["http"],"upTime":99.5,"speed":10.0,"latency":120.0}"#,
        )
        .unwrap();
        assert_eq!(p.up_time, 99.5);
    }

    #[test]
    fn test_quality_ordering() {
        let mut a = proxy("10.0.0.1", &["http"]);
        let mut b = proxy("10.0.0.2", &["http"]);
        let mut c = proxy("10.0.0.3", &["http"]);

        a.up_time = 90.0;
        b.up_time = 99.0;
        c.up_time = 99.0;
        b.latency = 500.0;
        c.latency = 50.0;

        let mut pool = vec![a.clone(), b.clone(), c.clone()];
        pool.sort_by(Proxy::quality_cmp);

        // Highest uptime first; latency breaks the tie.
        assert_eq!(pool[0].ip, "10.0.0.3");
        assert_eq!(pool[1].ip, "10.0.0.2");
        assert_eq!(pool[2].ip, "10.0.0.1");
    }

    #[test]
    fn test_snapshot_freshness() {
        let fresh = PoolSnapshot::new(vec![], Duration::from_secs(300));
        assert!(fresh.is_fresh());

        let stale = PoolSnapshot {
            proxies: vec![],
            fetched_at: Instant::now() - Duration::from_secs(301),
            ttl: Duration::from_secs(300),
        };
        assert!(!stale.is_fresh());
        assert!(stale.age() >= Duration::from_secs(301));
    }
}
