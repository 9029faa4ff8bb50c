//! Configuration System
//!
//! Loads the dashboard configuration from a TOML file and applies
//! `TRANSIT_*` environment variable overrides on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chart::LoadUnit;
use crate::client::ClientConfig;
use crate::dashboard::DashboardSettings;
use crate::state::Topology;
use crate::view::ComponentTable;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Element ids, only needed when embedding into a non-default page
    #[serde(default)]
    pub components: ComponentTable,
}

/// Backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path segment in front of the load and forecast endpoints
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub topology: Topology,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_namespace() -> String {
    "passengers".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            namespace: default_namespace(),
            topology: Topology::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// What the dashboard asks for
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_forecast_hours")]
    pub forecast_hours: u32,

    #[serde(default = "default_analytics_days")]
    pub analytics_days: u32,

    #[serde(default)]
    pub forecast_unit: LoadUnit,

    /// Refresh period of `watch`
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_forecast_hours() -> u32 {
    24
}

fn default_analytics_days() -> u32 {
    7
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            forecast_hours: default_forecast_hours(),
            analytics_days: default_analytics_days(),
            forecast_unit: LoadUnit::default(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load a file, then apply environment overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from an explicit path when given, otherwise from the default
    /// locations.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Self::load_default(),
        }
    }

    /// Load the first existing default location, or defaults when none
    /// exists. A file that exists but does not parse is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first(&Self::default_paths(), |key| std::env::var(key).ok())
    }

    fn load_first<F>(paths: &[PathBuf], lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load(path)?,
            None => Config::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Candidate config files, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("transit-dashboard").join("config.toml"));
        }
        paths.push(PathBuf::from("./transit-dashboard.toml"));
        paths
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `TRANSIT_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TRANSIT_API_URL") {
            self.api.base_url = url;
        }
        if let Some(namespace) = lookup("TRANSIT_NAMESPACE") {
            self.api.namespace = namespace;
        }
        if let Some(topology) = lookup("TRANSIT_TOPOLOGY") {
            self.api.topology = topology
                .parse::<Topology>()
                .map_err(|error| ConfigError::InvalidOverride {
                    key: "TRANSIT_TOPOLOGY",
                    value: topology.clone(),
                    error,
                })?;
        }

        if let Some(level) = lookup("TRANSIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TRANSIT_LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            namespace: self.api.namespace.clone(),
            request_timeout_ms: self.api.request_timeout_secs.saturating_mul(1000),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            topology: self.api.topology,
            forecast_hours: self.dashboard.forecast_hours,
            analytics_days: self.dashboard.analytics_days,
            forecast_unit: self.dashboard.forecast_unit,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard.poll_interval_secs.max(1))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid {key}={value:?}: {error}")]
    InvalidOverride {
        key: &'static str,
        value: String,
        error: String,
    },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Transit Dashboard Configuration
#
# Environment variables override these settings:
# - TRANSIT_API_URL
# - TRANSIT_NAMESPACE
# - TRANSIT_TOPOLOGY
# - TRANSIT_LOG_LEVEL
# - TRANSIT_LOG_FORMAT

[api]
# Backend base URL, including the API prefix
base_url = "http://localhost:8000/api/v1"

# Path segment for load and forecast endpoints
namespace = "passengers"

# route-stop: pick a route, then one of its stops
# stop-only: pick from one flat list of stops
topology = "route-stop"

# Request timeout in seconds
request_timeout_secs = 10

[dashboard]
# Forecast window (hours)
forecast_hours = 24

# Default analytics period (days)
analytics_days = 7

# Forecast values: percentage or count
forecast_unit = "percentage"

# Refresh period of the watch command (seconds)
poll_interval_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
