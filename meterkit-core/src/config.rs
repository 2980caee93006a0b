use crate::error::ConfigError;
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Log levels accepted by `metrics.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

/// Options consumed by the metrics façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Minimum severity to emit.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Prepended verbatim to every public metric name.
    #[serde(default)]
    pub prefix: String,
    /// Constant labels attached to every series of the registry.
    #[serde(default)]
    pub default_labels: BTreeMap<String, String>,
    /// Sampling period of the default runtime metrics.
    #[serde(default = "default_collect_interval")]
    pub collect_interval_secs: u64,
    /// When false, no default process/runtime metrics are collected.
    #[serde(default = "default_true")]
    pub default_metrics: bool,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_addr() -> String { "0.0.0.0:3000".into() }
fn default_log_level() -> String { "info".into() }
fn default_collect_interval() -> u64 { 10 }
fn default_true() -> bool { true }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prefix: String::new(),
            default_labels: BTreeMap::new(),
            collect_interval_secs: default_collect_interval(),
            default_metrics: true,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.addr.clone()))
    }
}

impl MetricsConfig {
    /// Collector period; a zero value is clamped to one second.
    pub fn collect_interval(&self) -> Duration {
        Duration::from_secs(self.collect_interval_secs.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a YAML file + `METERKIT_` env overrides.
    ///
    /// Nested env keys use a double underscore, e.g.
    /// `METERKIT_METRICS__LOG_LEVEL=debug`. Values are not validated here so
    /// that callers can apply their own overrides first; see
    /// [`MetricsConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("METERKIT_").split("__"))
            .extract()?;
        Ok(config)
    }
}
