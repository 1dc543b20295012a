//! Error types for the digest pipeline.
//!
//! Only [`DigestError::FeedList`], the configuration variants and output I/O
//! are fatal. Fetch and parse errors are raised per feed and absorbed by the
//! collector, which logs them and moves on to the next feed.

use thiserror::Error;

/// Common error type for the digest pipeline.
#[derive(Error, Debug)]
pub enum DigestError {
    /// The feed list file could not be read.
    #[error("failed to read feed list {path}: {source}")]
    FeedList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`crate::config::FileConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A config value was rejected during validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed endpoint answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    /// The feed body is not a recognizable RSS or Atom document.
    #[error("failed to parse feed: {0}")]
    Parse(String),

    /// The report could not be rendered.
    #[error("render error: {0}")]
    Render(#[from] std::fmt::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, DigestError>;
