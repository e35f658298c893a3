// src/config/mod.rs
//! Watcher configuration: optional TOML file, then environment overrides.
//! Everything is validated once, before the pipeline is built.

pub mod network;

use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub use network::Network;

const ENV_PATH: &str = "WATCHER_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/watcher.toml";

pub const DEFAULT_CONTRACT: &str = "farmforhoney";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_STARTUP_GRACE_SECS: u64 = 10;
const DEFAULT_SIMULATION_INTERVAL_SECS: u64 = 30;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("NETWORK must be 'mainnet' or 'testnet' (case-insensitive), got {0:?}")]
    InvalidNetwork(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("no provider endpoints configured")]
    NoEndpoints,
    #[error("WATCHER_CONFIG_PATH points to non-existent path {}", .0.display())]
    MissingFile(PathBuf),
    #[error("reading config from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Unvalidated settings as they come from a file or the environment.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub network: Option<String>,
    pub discord_webhook_url: Option<String>,
    pub contract: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub startup_grace_secs: Option<u64>,
    pub simulation_interval_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub endpoints: Option<Vec<String>>,
    pub test_mode: Option<bool>,
    pub metrics_addr: Option<String>,
}

impl RawConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Read every supported variable; unset or blank variables stay `None`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            network: env_str("NETWORK"),
            discord_webhook_url: env_str("DISCORD_WEBHOOK_URL"),
            contract: env_str("CONTRACT"),
            poll_interval_secs: env_u64("POLL_INTERVAL")?,
            startup_grace_secs: env_u64("STARTUP_GRACE_SECS")?,
            simulation_interval_secs: env_u64("SIMULATION_INTERVAL_SECS")?,
            http_timeout_secs: env_u64("HTTP_TIMEOUT_SECS")?,
            endpoints: env_str("API_ENDPOINTS")
                .map(|csv| csv.split(',').map(str::to_string).collect()),
            test_mode: env_bool("TEST_MODE")?,
            metrics_addr: env_str("METRICS_ADDR"),
        })
    }

    /// Values set in `over` win.
    pub fn merge(self, over: RawConfig) -> RawConfig {
        RawConfig {
            network: over.network.or(self.network),
            discord_webhook_url: over.discord_webhook_url.or(self.discord_webhook_url),
            contract: over.contract.or(self.contract),
            poll_interval_secs: over.poll_interval_secs.or(self.poll_interval_secs),
            startup_grace_secs: over.startup_grace_secs.or(self.startup_grace_secs),
            simulation_interval_secs: over
                .simulation_interval_secs
                .or(self.simulation_interval_secs),
            http_timeout_secs: over.http_timeout_secs.or(self.http_timeout_secs),
            endpoints: over.endpoints.or(self.endpoints),
            test_mode: over.test_mode.or(self.test_mode),
            metrics_addr: over.metrics_addr.or(self.metrics_addr),
        }
    }

    pub fn validate(self) -> Result<WatcherConfig, ConfigError> {
        let network: Network = self
            .network
            .as_deref()
            .ok_or(ConfigError::Missing("NETWORK"))?
            .parse()?;

        let discord_webhook_url = self
            .discord_webhook_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("DISCORD_WEBHOOK_URL"))?;
        if !discord_webhook_url.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                key: "DISCORD_WEBHOOK_URL",
                value: "<redacted>".to_string(),
            });
        }

        let contract = self
            .contract
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTRACT.to_string());

        let endpoints = clean_endpoints(
            self.endpoints
                .unwrap_or_else(|| network.default_endpoints()),
        );
        if endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }

        let metrics_addr = match self.metrics_addr {
            Some(raw) => Some(raw.trim().parse::<SocketAddr>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "METRICS_ADDR",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(WatcherConfig {
            network,
            discord_webhook_url,
            contract,
            endpoints,
            poll_interval: positive_secs(
                "POLL_INTERVAL",
                self.poll_interval_secs,
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            startup_grace: Duration::from_secs(
                self.startup_grace_secs
                    .unwrap_or(DEFAULT_STARTUP_GRACE_SECS),
            ),
            simulation_interval: positive_secs(
                "SIMULATION_INTERVAL_SECS",
                self.simulation_interval_secs,
                DEFAULT_SIMULATION_INTERVAL_SECS,
            )?,
            http_timeout: positive_secs(
                "HTTP_TIMEOUT_SECS",
                self.http_timeout_secs,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
            test_mode: self.test_mode.unwrap_or(false),
            metrics_addr,
        })
    }
}

/// Validated configuration handed to the pipeline. Never re-validated.
#[derive(Clone)]
pub struct WatcherConfig {
    pub network: Network,
    pub discord_webhook_url: String,
    pub contract: String,
    pub endpoints: Vec<String>,
    pub poll_interval: Duration,
    pub startup_grace: Duration,
    pub simulation_interval: Duration,
    pub http_timeout: Duration,
    pub test_mode: bool,
    pub metrics_addr: Option<SocketAddr>,
}

impl WatcherConfig {
    /// Load using env var + fallbacks:
    /// 1) file at $WATCHER_CONFIG_PATH
    /// 2) config/watcher.toml
    /// 3) environment only
    ///
    /// Environment variables override file values.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var(ENV_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(ConfigError::MissingFile(pb));
                }
                RawConfig::from_file(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_PATH);
                if default.exists() {
                    RawConfig::from_file(&default)?
                } else {
                    RawConfig::default()
                }
            }
        };
        file.merge(RawConfig::from_env()?).validate()
    }
}

// Keeps the webhook token out of logs.
impl fmt::Debug for WatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherConfig")
            .field("network", &self.network)
            .field("discord_webhook_url", &"<redacted>")
            .field("contract", &self.contract)
            .field("endpoints", &self.endpoints)
            .field("poll_interval", &self.poll_interval)
            .field("startup_grace", &self.startup_grace)
            .field("simulation_interval", &self.simulation_interval)
            .field("http_timeout", &self.http_timeout)
            .field("test_mode", &self.test_mode)
            .field("metrics_addr", &self.metrics_addr)
            .finish()
    }
}

fn env_str(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &'static str) -> Result<Option<u64>, ConfigError> {
    env_str(key)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue { key, value: v })
        })
        .transpose()
}

fn env_bool(key: &'static str) -> Result<Option<bool>, ConfigError> {
    env_str(key)
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value: v }),
        })
        .transpose()
}

fn positive_secs(key: &'static str, v: Option<u64>, default: u64) -> Result<Duration, ConfigError> {
    match v.unwrap_or(default) {
        0 => Err(ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Trim, drop trailing slashes and blanks, keep first occurrence order.
fn clean_endpoints(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().trim_end_matches('/');
        if !t.is_empty() && !out.iter().any(|e| e == t) {
            out.push(t.to_string());
        }
    }
    out
}
