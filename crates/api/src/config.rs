//! Application Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file (`pager.toml`, or the path in `PAGER_CONFIG`), then `PAGER__*`
//! environment variables (e.g. `PAGER__SERVER__ADDR=0.0.0.0:9090`).

use config::{Config, Environment, File};
use escalation::{EngineConfig, EscalationPolicy};
use notifier::NotifierConfig;
use scheduler::DispatcherConfig;
use serde::Deserialize;

/// Default config file stem, resolved as `pager.toml`
pub const DEFAULT_CONFIG_FILE: &str = "pager";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub dispatcher: DispatcherConfig,
    pub notifier: NotifierConfig,
    /// Escalation policies, one per service
    pub policies: Vec<EscalationPolicy>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Serve Prometheus metrics on `/metrics`
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            metrics: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load from the default file location and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("PAGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (optional) and environment
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("PAGER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Parse a TOML document, without consulting files or environment
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
