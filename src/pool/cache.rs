//! TTL-bounded proxy pool cache
//!
//! Holds the current `PoolSnapshot` behind an atomic pointer swap:
//! readers never lock, refreshes replace the snapshot wholesale, and
//! racing refreshes resolve last-writer-wins (one fetch result is
//! discarded, which is acceptable).

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tracing::{debug, info, instrument, warn};

use crate::models::{PoolSnapshot, Proxy};
use crate::pool::directory::ProxyDirectory;
use crate::pool::probe::LivenessProbe;

/// How proxies are admitted into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMode {
    /// Use directory candidates unvalidated. Cheaper refreshes, more
    /// failed attempts at request time.
    Rotation,
    /// Probe the best candidates upfront and admit only live ones.
    Validated,
}

impl PoolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolMode::Rotation => "rotation",
            PoolMode::Validated => "validated",
        }
    }
}

/// The shared proxy pool.
pub struct ProxyPool {
    directory: Arc<dyn ProxyDirectory>,
    probe: Option<Arc<dyn LivenessProbe>>,
    ttl: Duration,
    snapshot: ArcSwapOption<PoolSnapshot>,
}

impl ProxyPool {
    /// Probe at most this many ranked candidates per refresh.
    const PROBE_CANDIDATE_CAP: usize = 20;
    /// Stop probing once this many live proxies are admitted.
    const PROBE_TARGET_LIVE: usize = 5;

    /// Pool in rotation mode: candidates are used unvalidated.
    pub fn new(directory: Arc<dyn ProxyDirectory>, ttl: Duration) -> Self {
        Self {
            directory,
            probe: None,
            ttl,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Pool in validation mode: candidates are probed before admission.
    pub fn with_probe(
        directory: Arc<dyn ProxyDirectory>,
        probe: Arc<dyn LivenessProbe>,
        ttl: Duration,
    ) -> Self {
        Self {
            directory,
            probe: Some(probe),
            ttl,
            snapshot: ArcSwapOption::empty(),
        }
    }

    pub fn mode(&self) -> PoolMode {
        if self.probe.is_some() {
            PoolMode::Validated
        } else {
            PoolMode::Rotation
        }
    }

    /// Get the current snapshot, refreshing first if it is stale or the
    /// pool has never been fetched. Never fails: a failed refresh
    /// produces an empty snapshot, not an error.
    pub async fn snapshot(&self) -> Arc<PoolSnapshot> {
        if let Some(current) = self.snapshot.load_full() {
            if current.is_fresh() {
                debug!("Using cached pool snapshot ({} proxies)", current.len());
                return current;
            }
        }

        self.refresh().await
    }

    /// Fetch, rank, optionally validate, and atomically publish a new
    /// snapshot.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Arc<PoolSnapshot> {
        info!("Refreshing proxy pool");

        let mut candidates: Vec<Proxy> = self
            .directory
            .fetch()
            .await
            .into_iter()
            .filter(Proxy::supports_http)
            .collect();

        candidates.sort_by(Proxy::quality_cmp);

        let proxies = match &self.probe {
            Some(probe) => self.validate(probe.as_ref(), candidates).await,
            None => candidates,
        };

        if proxies.is_empty() {
            warn!("Pool refresh produced no usable proxies; serving empty pool");
        } else {
            info!("Pool refreshed with {} proxies", proxies.len());
        }

        let snapshot = Arc::new(PoolSnapshot::new(proxies, self.ttl));
        self.snapshot.store(Some(snapshot.clone()));
        snapshot
    }

    async fn validate(&self, probe: &dyn LivenessProbe, candidates: Vec<Proxy>) -> Vec<Proxy> {
        let limit = candidates.len().min(Self::PROBE_CANDIDATE_CAP);
        info!("Validating top {} of {} candidates", limit, candidates.len());

        let mut live = Vec::new();
        for candidate in candidates.into_iter().take(Self::PROBE_CANDIDATE_CAP) {
            if probe.is_live(&candidate).await {
                live.push(candidate);
                if live.len() >= Self::PROBE_TARGET_LIVE {
                    break;
                }
            }
        }

        info!("Validated {} live proxies", live.len());
        live
    }

    /// Number of proxies in the current snapshot, without refreshing.
    pub fn available(&self) -> usize {
        self.snapshot
            .load()
            .as_ref()
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Age of the current snapshot; `None` before the first fetch.
    pub fn age(&self) -> Option<Duration> {
        self.snapshot.load().as_ref().map(|s| s.age())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn proxy(ip: &str, protocols: &[&str], up_time: f64) -> Proxy {
        Proxy {
            ip: ip.to_string(),
            port: 8080,
            protocols: protocols.iter().map(|p| p.to_string()).collect(),
            up_time,
            speed: 0.0,
            latency: 0.0,
        }
    }

    struct FakeDirectory {
        proxies: Vec<Proxy>,
        fetches: AtomicUsize,
    }

    impl FakeDirectory {
        fn new(proxies: Vec<Proxy>) -> Arc<Self> {
            Arc::new(Self {
                proxies,
                fetches: AtomicUsize::new(0),
            })
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProxyDirectory for FakeDirectory {
        async fn fetch(&self) -> Vec<Proxy> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.proxies.clone()
        }
    }

    struct FakeProbe {
        live_ips: Vec<String>,
        probes: AtomicUsize,
    }

    impl FakeProbe {
        fn new(live_ips: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                live_ips: live_ips.iter().map(|s| s.to_string()).collect(),
                probes: AtomicUsize::new(0),
            })
        }

        fn probe_count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LivenessProbe for FakeProbe {
        async fn is_live(&self, proxy: &Proxy) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.live_ips.contains(&proxy.ip)
        }
    }

    #[tokio::test]
    async fn test_fresh_snapshot_is_reused_without_fetching() {
        let directory = FakeDirectory::new(vec![proxy("1.1.1.1", &["http"], 99.0)]);
        let pool = ProxyPool::new(directory.clone(), Duration::from_secs(300));

        let first = pool.snapshot().await;
        let second = pool.snapshot().await;

        assert_eq!(directory.fetch_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_stale_snapshot_triggers_refresh() {
        let directory = FakeDirectory::new(vec![proxy("1.1.1.1", &["http"], 99.0)]);
        let pool = ProxyPool::new(directory.clone(), Duration::from_millis(0));

        pool.snapshot().await;
        pool.snapshot().await;

        assert_eq!(directory.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_non_http_proxies_are_filtered_out() {
        let directory = FakeDirectory::new(vec![
            proxy("1.1.1.1", &["socks5"], 99.0),
            proxy("2.2.2.2", &["http"], 80.0),
            proxy("3.3.3.3", &["https"], 70.0),
        ]);
        let pool = ProxyPool::new(directory, Duration::from_secs(300));

        let snapshot = pool.snapshot().await;
        let ips: Vec<&str> = snapshot.proxies.iter().map(|p| p.ip.as_str()).collect();
        assert_eq!(ips, vec!["2.2.2.2", "3.3.3.3"]);
    }

    #[tokio::test]
    async fn test_empty_fetch_degrades_to_empty_snapshot() {
        let directory = FakeDirectory::new(vec![]);
        let pool = ProxyPool::new(directory, Duration::from_secs(300));

        let snapshot = pool.snapshot().await;
        assert!(snapshot.is_empty());
        assert_eq!(pool.available(), 0);
        assert!(pool.age().is_some());
    }

    #[tokio::test]
    async fn test_validation_stops_at_target_live_count() {
        // 10 candidates, all live: probing must stop after 5.
        let proxies: Vec<Proxy> = (0..10)
            .map(|i| proxy(&format!("10.0.0.{}", i), &["http"], 99.0))
            .collect();
        let live_ips: Vec<String> = proxies.iter().map(|p| p.ip.clone()).collect();
        let live_refs: Vec<&str> = live_ips.iter().map(|s| s.as_str()).collect();

        let directory = FakeDirectory::new(proxies);
        let probe = FakeProbe::new(&live_refs);
        let pool = ProxyPool::with_probe(directory, probe.clone(), Duration::from_secs(300));

        let snapshot = pool.snapshot().await;
        assert_eq!(snapshot.len(), 5);
        assert_eq!(probe.probe_count(), 5);
    }

    #[tokio::test]
    async fn test_validation_caps_probed_candidates() {
        // 30 candidates, none live: at most 20 probes, empty pool.
        let proxies: Vec<Proxy> = (0..30)
            .map(|i| proxy(&format!("10.0.1.{}", i), &["http"], 50.0))
            .collect();

        let directory = FakeDirectory::new(proxies);
        let probe = FakeProbe::new(&[]);
        let pool = ProxyPool::with_probe(directory, probe.clone(), Duration::from_secs(300));

        let snapshot = pool.snapshot().await;
        assert!(snapshot.is_empty());
        assert_eq!(probe.probe_count(), 20);
    }

    #[tokio::test]
    async fn test_validation_probes_best_candidates_first() {
        let directory = FakeDirectory::new(vec![
            proxy("10.0.0.1", &["http"], 10.0),
            proxy("10.0.0.2", &["http"], 90.0),
        ]);
        let probe = FakeProbe::new(&["10.0.0.1", "10.0.0.2"]);
        let pool = ProxyPool::with_probe(directory, probe, Duration::from_secs(300));

        let snapshot = pool.snapshot().await;
        // Ranking by uptime puts 10.0.0.2 first.
        assert_eq!(snapshot.proxies[0].ip, "10.0.0.2");
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_fetch() {
        let directory = FakeDirectory::new(vec![proxy("1.1.1.1", &["http"], 99.0)]);
        let pool = Arc::new(ProxyPool::new(directory.clone(), Duration::from_secs(300)));

        // Prime the cache, then hammer it concurrently within the TTL.
        pool.snapshot().await;
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.snapshot().await })
            })
            .collect();

        let mut snapshots = Vec::new();
        for task in tasks {
            snapshots.push(task.await.unwrap());
        }

        assert_eq!(directory.fetch_count(), 1);
        assert!(snapshots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_pool_mode_names() {
        assert_eq!(PoolMode::Rotation.as_str(), "rotation");
        assert_eq!(PoolMode::Validated.as_str(), "validated");
    }
}
