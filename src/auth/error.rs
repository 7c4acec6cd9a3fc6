use thiserror::Error;

use crate::error::TunecastError;

/// Normalized errors across the login, callback, and refresh flows.
///
/// `Clone` so a failure can be observed by every caller sharing an
/// in-flight refresh future.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Malformed auth response: {0}")]
    MalformedResponse(String),
    #[error("Authorization code already consumed")]
    CodeConsumed,
    #[error("Auth request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<AuthError> for TunecastError {
    fn from(error: AuthError) -> Self {
        TunecastError::Authentication(error.to_string())
    }
}
