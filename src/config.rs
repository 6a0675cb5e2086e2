use crate::error::{FerryError, Result};
use std::env;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening address
    pub server: ServerConfig,
    /// Proxy pool configuration
    pub pool: PoolConfig,
    /// Relay behavior
    pub relay: RelayConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port for the gateway (default: 5000)
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Proxy directory endpoints
    pub endpoints: Vec<String>,
    /// Snapshot TTL in seconds
    pub cache_ttl: u64,
    /// Probe candidates before admitting them to the pool
    pub validate: bool,
    /// Echo-IP endpoint used by the liveness probe
    pub probe_url: String,
    /// Per-probe timeout in seconds
    pub probe_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum distinct-proxy attempts before the direct fallback
    pub max_retries: u32,
    /// Outbound timeout for general forwarding, in seconds
    pub forward_timeout: u64,
    /// Outbound timeout for chat completions, in seconds
    pub chat_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

const DEFAULT_DIRECTORY_ENDPOINT: &str = "https://proxylist.geonode.com/api/proxy-list?limit=500";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoints: Vec<String> = get_env_or("FERRY_PROXY_ENDPOINTS", DEFAULT_DIRECTORY_ENDPOINT)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        for endpoint in &endpoints {
            Url::parse(endpoint).map_err(|e| {
                FerryError::InvalidConfig(format!(
                    "FERRY_PROXY_ENDPOINTS entry {} is not a valid URL: {}",
                    endpoint, e
                ))
            })?;
        }

        let probe_url = get_env_or("FERRY_PROBE_URL", "http://httpbin.org/ip");
        Url::parse(&probe_url).map_err(|e| {
            FerryError::InvalidConfig(format!("FERRY_PROBE_URL is not a valid URL: {}", e))
        })?;

        Ok(Config {
            server: ServerConfig {
                host: get_env_or("FERRY_HOST", "0.0.0.0"),
                port: get_env_or("FERRY_PORT", "5000").parse().map_err(|_| {
                    FerryError::InvalidConfig("FERRY_PORT must be a valid port number".into())
                })?,
            },
            pool: PoolConfig {
                endpoints,
                cache_ttl: get_env_or("FERRY_CACHE_TTL_SECS", "300").parse().unwrap_or(300),
                validate: get_env_or("FERRY_VALIDATE_PROXIES", "false")
                    .parse()
                    .unwrap_or(false),
                probe_url,
                probe_timeout: get_env_or("FERRY_PROBE_TIMEOUT_SECS", "5")
                    .parse()
                    .unwrap_or(5),
            },
            relay: RelayConfig {
                max_retries: get_env_or("FERRY_MAX_RETRIES", "3").parse().unwrap_or(3),
                forward_timeout: get_env_or("FERRY_FORWARD_TIMEOUT_SECS", "30")
                    .parse()
                    .unwrap_or(30),
                chat_timeout: get_env_or("FERRY_CHAT_TIMEOUT_SECS", "120")
                    .parse()
                    .unwrap_or(120),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "json"),
            },
        })
    }

    /// Get the gateway listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
