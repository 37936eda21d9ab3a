// src/error.rs

//! Unified error handling for the feed service.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport-level failure talking to the ticketing site
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The ticketing site answered with a non-2xx status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Structural extraction failed
    #[error("Parse error: {0}")]
    Parse(String),

    /// One or more listing pages failed during an aggregate fetch
    #[error(transparent)]
    AggregateFetch(#[from] AggregateFetchError),

    /// Feed could not be rendered to RSS
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The caller's deadline elapsed before the feed was ready
    #[error("Timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a parse error.
    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// Create an upstream HTTP error, keeping at most `excerpt_len` characters of the body.
    pub fn upstream(status: u16, body: &str, excerpt_len: usize) -> Self {
        Self::UpstreamHttp {
            status,
            body: body.chars().take(excerpt_len).collect(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<rss::Error> for AppError {
    fn from(error: rss::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// A single listing page that could not be fetched or parsed.
#[derive(Debug)]
pub struct PageFailure {
    pub page: u32,
    pub error: AppError,
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}: {}", self.page, self.error)
    }
}

/// Every per-page failure of one aggregate fetch, joined rather than short-circuited.
#[derive(Error, Debug)]
#[error("{} of {} page(s) failed:\n{}", .failures.len(), .pages, join_failures(.failures))]
pub struct AggregateFetchError {
    pub pages: u32,
    pub failures: Vec<PageFailure>,
}

fn join_failures(failures: &[PageFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
