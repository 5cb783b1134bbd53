//! Error types for the setlog_core library.
//!
//! Session mutations never fail; these errors only come out of the
//! file-backed adapters, configuration and routine loading.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for setlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error (config and routine files)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Routine catalog lookup or validation error
    #[error("Routine catalog error: {0}")]
    Catalog(String),

    /// Persisted session state error
    #[error("Session state error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
