//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::parse::{parse_duration, parse_rate_limit, RateLimit};
use crate::error::{Error, Result};

/// Default cache max age when caching is simply switched on.
pub const DEFAULT_CACHE_MAX_AGE: u64 = 86400;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Account credentials configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Value of the `FANBOXSESSID` cookie.
    #[serde(default)]
    pub session_id: String,

    /// Browser user agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Response caching switch: a boolean, a number of seconds or a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSetting {
    Enabled(bool),
    Seconds(u64),
    Duration(String),
}

impl CacheSetting {
    /// Resolve the setting to a cache max age in seconds. Zero disables caching.
    pub fn max_age(&self) -> Result<u64> {
        match self {
            CacheSetting::Enabled(true) => Ok(DEFAULT_CACHE_MAX_AGE),
            CacheSetting::Enabled(false) => Ok(0),
            CacheSetting::Seconds(seconds) => Ok(*seconds),
            CacheSetting::Duration(duration) => parse_duration(duration),
        }
    }
}

impl Default for CacheSetting {
    fn default() -> Self {
        CacheSetting::Enabled(true)
    }
}

impl From<bool> for CacheSetting {
    fn from(enabled: bool) -> Self {
        CacheSetting::Enabled(enabled)
    }
}

impl From<u64> for CacheSetting {
    fn from(seconds: u64) -> Self {
        CacheSetting::Seconds(seconds)
    }
}

impl From<&str> for CacheSetting {
    fn from(duration: &str) -> Self {
        CacheSetting::Duration(duration.to_string())
    }
}

/// HTTP client configuration shared by every platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Response caching (defaults to one day).
    #[serde(default)]
    pub cache: CacheSetting,

    /// Only cache responses the server allows to be cached.
    #[serde(default)]
    pub follow_cache_control: bool,

    /// Maximum retries for connection failures.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Request quota, e.g. `"10 req/s"`.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: String,

    /// Upstream proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Overrides the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache: CacheSetting::default(),
            follow_cache_control: false,
            retries: default_retries(),
            rate_limit: default_rate_limit(),
            proxy: None,
            cache_dir: None,
        }
    }
}

impl ClientConfig {
    /// Cache max age in seconds.
    pub fn cache_max_age(&self) -> Result<u64> {
        self.cache.max_age()
    }

    /// Parsed request quota.
    pub fn rate_limit(&self) -> Result<RateLimit> {
        parse_rate_limit(&self.rate_limit)
    }
}

/// Output options for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory rendered post bodies are written to.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Pretty-print rendered post bodies.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            pretty: true,
        }
    }
}

fn default_retries() -> u32 {
    3
}

fn default_rate_limit() -> String {
    "10 req/s".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective output directory.
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
