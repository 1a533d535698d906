use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;

/// Complete Beacon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BeaconConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

fn default_bind_addr() -> SocketAddr {
    ([0, 0, 0, 0], 3000).into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Bounded history configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Entries retained before oldest-first eviction kicks in
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    100
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Live-stream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Keep-alive comment interval (seconds)
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
    /// Reconnect back-off hint sent to EventSource clients (milliseconds)
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,
    /// Per-subscriber delivery buffer; a full buffer detaches the subscriber
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_keep_alive_seconds() -> u64 {
    15
}

fn default_retry_ms() -> u64 {
    5000
}

fn default_channel_capacity() -> usize {
    32
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            keep_alive_seconds: default_keep_alive_seconds(),
            retry_ms: default_retry_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Cross-origin policy configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API; empty allows any origin
    /// (development mode)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Request limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_body_limit_bytes() -> usize {
    1_048_576 // 1 MB
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            history: HistoryConfig::default(),
            stream: StreamConfig::default(),
            cors: CorsConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl BeaconConfig {
    /// Apply environment overrides on top of the loaded file (or defaults).
    /// Unparseable values fall through to whatever was already set.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("BEACON_BIND_ADDR") {
            if let Ok(addr) = v.parse() {
                self.server.bind_addr = addr;
            }
        }
        if let Ok(v) = std::env::var("BEACON_HISTORY_CAPACITY") {
            if let Ok(n) = v.parse::<usize>() {
                self.history.capacity = n;
            }
        }
        if let Ok(v) = std::env::var("BEACON_KEEP_ALIVE_SECONDS") {
            if let Ok(n) = v.parse::<u64>() {
                self.stream.keep_alive_seconds = n;
            }
        }
        if let Ok(v) = std::env::var("BEACON_RETRY_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.stream.retry_ms = n;
            }
        }
        if let Ok(v) = std::env::var("BEACON_BODY_LIMIT_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                self.limits.body_limit_bytes = n;
            }
        }
        if let Ok(v) = std::env::var("BEACON_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<BeaconConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path))?;
    let config: BeaconConfig =
        toml::from_str(&contents).with_context(|| format!("failed to parse config file {}", path))?;
    Ok(config)
}
