//! Configuration management for the monitor
//!
//! Configuration comes from environment variables (the usual deployment) or
//! from a TOML file. Both paths produce the same [`Config`], which is checked
//! by [`Config::validate`] before anything connects.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::fetcher::client::{DEFAULT_BASE_URL, DEFAULT_REQUESTS_PER_SECOND};
use crate::utils::retry::BackoffPolicy;

/// Lowest accepted update interval
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// Update interval used when none (or garbage) is configured
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 120;

/// Configuration errors, fatal at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chat platform configuration
    pub discord: DiscordConfig,

    /// Monitored server configuration
    pub monitor: MonitorConfig,

    /// Upstream listing configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Retry delays after failed cycles
    #[serde(default)]
    pub backoff: BackoffPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat platform configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token
    pub token: String,

    /// Channel for the live message, if known at startup
    #[serde(default)]
    pub update_channel_id: Option<u64>,

    /// Prefix for text commands
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

/// Monitored server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Case-insensitive substring of the server name
    pub server_name: String,

    /// Seconds between periodic updates
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
}

/// Upstream listing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Listing endpoint
    pub api_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Client-side rate limit (requests per second)
    pub requests_per_second: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn default_command_prefix() -> String {
    String::from("!")
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            update_channel_id: None,
            command_prefix: default_command_prefix(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            server_name: String::new(),
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: String::from(DEFAULT_BASE_URL),
            request_timeout_secs: 10,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl UpstreamConfig {
    /// Upstream settings alone, for commands that never touch Discord
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            api_url: non_empty(lookup, "BFBC2_API_URL").unwrap_or(defaults.api_url),
            request_timeout_secs: non_empty(lookup, "BFBC2_REQUEST_TIMEOUT")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.request_timeout_secs),
            requests_per_second: defaults.requests_per_second,
        }
    }

    /// Request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl LoggingConfig {
    /// Logging settings alone, read before the rest of the configuration
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            level: non_empty(lookup, "BFBC2_LOG_LEVEL").unwrap_or(defaults.level),
            format: non_empty(lookup, "BFBC2_LOG_FORMAT").unwrap_or(defaults.format),
        }
    }
}

/// Non-empty, trimmed value of `key`
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the optional channel id; anything unusable means "not configured"
fn parse_channel_id(raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            tracing::warn!(value = %raw, "Invalid UPDATE_CHANNEL_ID, use setchannel instead");
            None
        }
    }
}

/// Parse the update interval, applying the default and the floor
fn parse_interval(raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return DEFAULT_UPDATE_INTERVAL_SECS;
    };

    match raw.parse::<u64>() {
        Ok(secs) if secs < MIN_UPDATE_INTERVAL.as_secs() => {
            tracing::warn!(
                value = secs,
                floor = MIN_UPDATE_INTERVAL.as_secs(),
                "UPDATE_INTERVAL_SECONDS below minimum, raising it"
            );
            MIN_UPDATE_INTERVAL.as_secs()
        }
        Ok(secs) => secs,
        Err(_) => {
            tracing::warn!(
                value = %raw,
                default = DEFAULT_UPDATE_INTERVAL_SECS,
                "Invalid UPDATE_INTERVAL_SECONDS, using default"
            );
            DEFAULT_UPDATE_INTERVAL_SECS
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    ///
    /// Missing required keys are reported; optional keys with unusable values
    /// fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token =
            non_empty(&lookup, "DISCORD_TOKEN").ok_or_else(|| ConfigError::missing("DISCORD_TOKEN"))?;
        let server_name = non_empty(&lookup, "BFBC2_SERVER_NAME")
            .ok_or_else(|| ConfigError::missing("BFBC2_SERVER_NAME"))?;

        let update_channel_id = parse_channel_id(non_empty(&lookup, "UPDATE_CHANNEL_ID"));
        let update_interval_secs = parse_interval(non_empty(&lookup, "UPDATE_INTERVAL_SECONDS"));

        let command_prefix =
            non_empty(&lookup, "BFBC2_COMMAND_PREFIX").unwrap_or_else(default_command_prefix);

        let config = Self {
            discord: DiscordConfig {
                token,
                update_channel_id,
                command_prefix,
            },
            monitor: MonitorConfig {
                server_name,
                update_interval_secs,
            },
            upstream: UpstreamConfig::from_lookup(&lookup),
            backoff: BackoffPolicy::default(),
            logging: LoggingConfig::from_lookup(&lookup),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discord.token.trim().is_empty() {
            return Err(ConfigError::missing("DISCORD_TOKEN"));
        }

        if self.monitor.server_name.trim().is_empty() {
            return Err(ConfigError::missing("BFBC2_SERVER_NAME"));
        }

        if self.discord.command_prefix.trim().is_empty() {
            return Err(ConfigError::invalid(
                "BFBC2_COMMAND_PREFIX",
                "command prefix must not be empty",
            ));
        }

        if self.monitor.update_interval_secs < MIN_UPDATE_INTERVAL.as_secs() {
            return Err(ConfigError::invalid(
                "UPDATE_INTERVAL_SECONDS",
                format!("must be at least {}", MIN_UPDATE_INTERVAL.as_secs()),
            ));
        }

        if !self.upstream.api_url.starts_with("http://")
            && !self.upstream.api_url.starts_with("https://")
        {
            return Err(ConfigError::invalid("BFBC2_API_URL", "must be an http(s) URL"));
        }

        if self.upstream.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "BFBC2_REQUEST_TIMEOUT",
                "must be greater than 0",
            ));
        }

        if self.upstream.requests_per_second == 0 {
            return Err(ConfigError::invalid(
                "requests_per_second",
                "must be greater than 0",
            ));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::invalid(
                "BFBC2_LOG_FORMAT",
                "must be \"text\" or \"json\"",
            ));
        }

        self.backoff
            .validate()
            .map_err(|reason| ConfigError::invalid("backoff", reason))
    }

    /// Update interval as Duration
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.update_interval_secs)
    }

    /// Request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.upstream.request_timeout()
    }
}
