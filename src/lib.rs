//! Tunecast — client SDK for the tunecast scheduling backend.
//!
//! Manages an OAuth-derived bearer session (persistent store, expiry
//! detection, single-flight refresh, consent redirects) and wraps the
//! backend's tune endpoints in a typed async client.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tunecast::auth::{FileSessionStore, OAuthFlow, SessionManager};
//! use tunecast::config::TunecastConfig;
//! use tunecast::tunes::{TuneFilters, TunesClient};
//!
//! # async fn example() -> tunecast::error::Result<()> {
//! let config = TunecastConfig::from_env();
//! let store = Arc::new(FileSessionStore::new(config.session_store_config()));
//! let flow = Arc::new(OAuthFlow::new(config.base_url(), store.clone()));
//! let sessions = SessionManager::new(store.clone(), flow);
//!
//! if sessions.valid_credential().await?.is_none() {
//!     // No usable session: run the login flow and come back.
//! }
//!
//! let tunes = TunesClient::new(config.base_url(), store);
//! let page = tunes.list(1, 10, &TuneFilters::default()).await?;
//! println!("{} tunes on page 1", page.data.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod tunes;
