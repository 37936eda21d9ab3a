// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP serving settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Ticketing site and HTTP client settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Feed sizing and caching
    #[serde(default)]
    pub feed: FeedConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.user_agent.trim().is_empty() {
            return Err(AppError::validation("upstream.user_agent is empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(AppError::validation("upstream.timeout_secs must be > 0"));
        }
        self.upstream.base_url().map_err(|e| {
            AppError::validation(format!(
                "upstream.base_url '{}' is invalid: {e}",
                self.upstream.base_url
            ))
        })?;
        if self.server.request_timeout_secs == 0 {
            return Err(AppError::validation(
                "server.request_timeout_secs must be > 0",
            ));
        }
        if self.feed.max_items == 0 {
            return Err(AppError::validation("feed.max_items must be > 0"));
        }
        if self.feed.page_count == 0 {
            return Err(AppError::validation("feed.page_count must be > 0"));
        }
        if self.feed.cache_capacity == 0 {
            return Err(AppError::validation("feed.cache_capacity must be > 0"));
        }
        Ok(())
    }
}

/// HTTP serving settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind")]
    pub bind: String,

    /// Minimum seconds between upstream refreshes of one feed (0 disables)
    #[serde(default = "defaults::debounce")]
    pub debounce_secs: u64,

    /// Deadline for producing a feed for one request
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Debounce window, `None` when disabled.
    pub fn debounce(&self) -> Option<Duration> {
        (self.debounce_secs > 0).then(|| Duration::from_secs(self.debounce_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            debounce_secs: defaults::debounce(),
            request_timeout_secs: defaults::request_timeout(),
        }
    }
}

/// Ticketing site and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Root of the ticketing site
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// How much of an error response body to keep in error messages
    #[serde(default = "defaults::body_excerpt_len")]
    pub body_excerpt_len: usize,
}

impl UpstreamConfig {
    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            body_excerpt_len: defaults::body_excerpt_len(),
        }
    }
}

/// What a refresh does when only some listing pages could be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialFailurePolicy {
    /// Discard the whole refresh and keep the previous items
    #[default]
    Abort,
    /// Merge the pages that succeeded and log the rest
    Partial,
}

/// Feed sizing and caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum items kept per feed
    #[serde(default = "defaults::max_items")]
    pub max_items: usize,

    /// Listing pages fetched per refresh
    #[serde(default = "defaults::page_count")]
    pub page_count: u32,

    /// Maximum number of cached location feeds
    #[serde(default = "defaults::cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default)]
    pub partial_failure: PartialFailurePolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_items: defaults::max_items(),
            page_count: defaults::page_count(),
            cache_capacity: defaults::cache_capacity(),
            partial_failure: PartialFailurePolicy::default(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `env_logger` filter, overridden by `RUST_LOG`
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    // Server defaults
    pub fn bind() -> String {
        "0.0.0.0:8080".into()
    }
    pub fn debounce() -> u64 {
        300
    }
    pub fn request_timeout() -> u64 {
        60
    }

    // Upstream defaults
    pub fn base_url() -> String {
        "https://nhs.ticketsforgood.co.uk".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; t4g-feed/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn body_excerpt_len() -> usize {
        512
    }

    // Feed defaults
    pub fn max_items() -> usize {
        75
    }
    pub fn page_count() -> u32 {
        5
    }
    pub fn cache_capacity() -> usize {
        10
    }

    // Logging defaults
    pub fn level() -> String {
        "info".into()
    }
}
