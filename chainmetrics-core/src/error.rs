//! Error types for the metrics client and configuration.

use crate::source::FetchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// Caller mistake detected before any data is touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Whatever the fetch source reported, unchanged.
    #[error(transparent)]
    Transport(#[from] FetchError),

    /// The response does not fit the requested columns.
    #[error("response shape mismatch: {0}")]
    Shape(String),

    #[error("timestamp {0} is outside the representable calendar range")]
    InvalidTimestamp(i64),

    #[error("export error: {0}")]
    Export(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
