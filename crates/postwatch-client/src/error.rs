//! Error types for the collector client

use thiserror::Error;

/// Errors that can occur when talking to the collector
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Device has no reports
    #[error("no reports for device: {0}")]
    NotFound(String),

    /// Collector returned an error status
    #[error("collector error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the collector
        message: String,
    },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
