//! Error handling for the ContractSpec transformation engine.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! Batch operations (parsing, importing, diffing) do not surface per-item
//! failures through this type: those are collected into the warning, skip and
//! error buckets of their result objects. `Error` is reserved for failures that
//! abort a single call, such as an unreadable document or a fetch timeout.
//!
//! # Examples
//!
//! ```
//! use contractspec_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::openapi("missing 'paths' object"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::time::Duration;

use thiserror::Error;

/// Result type for ContractSpec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ContractSpec operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OpenAPI document error
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Code generation error
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote document answered with a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    /// A remote document did not answer within the configured timeout
    #[error("Timed out after {}s fetching {url}", timeout.as_secs())]
    FetchTimeout { url: String, timeout: Duration },

    /// A `$ref` chain points back at itself
    #[error("Cyclic $ref detected: {0}")]
    CyclicReference(String),

    /// A source type that is recognised but not importable yet
    #[error("Unsupported source type: {0}")]
    UnsupportedSource(String),

    /// Two specs share the same registry key
    #[error("Duplicate spec in registry: {0}")]
    DuplicateSpec(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create a new generation error
    pub fn generation<S: Into<String>>(msg: S) -> Self {
        Self::Generation(msg.into())
    }

    /// Whether this error came from the network boundary
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::FetchTimeout { .. } | Self::Http(_)
        )
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
