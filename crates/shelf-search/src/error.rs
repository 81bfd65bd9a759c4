//! Error types for shelf search
//!
//! Provides error handling for:
//! - Remote lookups (transport, status, decode, timeout)
//! - Configuration loading and validation

use std::path::PathBuf;

/// Errors raised by a book lookup
///
/// Every variant collapses into [`QueryStatus::Failed`](crate::QueryStatus::Failed)
/// inside the executor; the variants only differ in the reason text.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Network unreachable, connection reset, TLS failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Endpoint answered with a non-success status code
    #[error("endpoint returned status {status}")]
    Status { status: u16 },

    /// Payload could not be decoded
    #[error("malformed payload: {0}")]
    Decode(String),

    /// Lookup could not be constructed from configuration
    #[error("invalid lookup configuration: {0}")]
    InvalidConfig(String),
}

impl LookupError {
    /// Check if error came from the transport layer
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }

    /// Check if error is a timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if a later, identical request could succeed
    ///
    /// The executor never retries on its own; callers that surface errors
    /// can use this to decide whether to suggest trying again.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { status } => *status >= 500,
            Self::Decode(_) | Self::InvalidConfig(_) => false,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Errors loading or validating [`ShelfConfig`](crate::ShelfConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML could not be parsed
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Base URL is not an absolute http(s) URL
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A field is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level error for the shelf surfaces
#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lookup error
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),
}
