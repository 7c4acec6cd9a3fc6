//! Client configuration (layered: code > env > defaults).

use std::path::PathBuf;

use crate::auth::store::SessionStoreConfig;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Where the backend lives and where the session file goes.
///
/// Resolution order: explicit builder overrides, then the environment
/// (`TUNECAST_BASE_URL`, `TUNECAST_SESSION_DIR`, with `.env` support),
/// then defaults.
#[derive(Debug, Clone)]
pub struct TunecastConfig {
    base_url: String,
    session_dir: PathBuf,
}

impl Default for TunecastConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TunecastConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_dir: SessionStoreConfig::default_dir(),
        }
    }

    /// Load from environment variables, reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();
        if let Ok(url) = std::env::var("TUNECAST_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(dir) = std::env::var("TUNECAST_SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_dir(&self) -> &PathBuf {
        &self.session_dir
    }

    /// Store configuration for a [`crate::auth::FileSessionStore`].
    pub fn session_store_config(&self) -> SessionStoreConfig {
        SessionStoreConfig::new(self.session_dir.clone())
    }
}
