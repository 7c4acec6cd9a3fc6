//! Error types for Tunecast.

use thiserror::Error;

use crate::tunes::TuneValidationError;

/// Primary error type for all Tunecast operations.
#[derive(Error, Debug)]
pub enum TunecastError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {title}: {message}")]
    Api {
        status: u16,
        title: String,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tune: {0}")]
    InvalidTune(#[from] TuneValidationError),
}

impl TunecastError {
    /// Create an API error from a status and the backend's title/message pair.
    pub fn api(status: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TunecastError>;
