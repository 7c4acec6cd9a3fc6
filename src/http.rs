//! Shared HTTP client and session-aware request plumbing.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::auth::SessionStore;
use crate::error::TunecastError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a JSON API call, attaching the stored bearer
/// credential when one exists.
///
/// This reads the store as-is and never triggers a refresh; a stale
/// credential fails at the backend as an ordinary authorization error.
/// Callers that need freshness go through `SessionManager` first.
pub fn session_headers(store: &dyn SessionStore) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(Some(record)) = store.load() {
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", record.credential)) {
            headers.insert(AUTHORIZATION, val);
        }
    }
    headers
}

/// Map a non-success HTTP status and body into a typed error.
///
/// The backend wraps errors as `{title, message}`; bare FastAPI rejections
/// arrive as `{detail}`. Anything unparseable falls back to the raw body.
pub fn status_to_error(status: u16, body: &str) -> TunecastError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let title = parsed
        .as_ref()
        .and_then(|b| b.title.clone())
        .unwrap_or_else(|| "Request failed".to_string());
    let message = parsed
        .and_then(|b| b.message.or(b.detail))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("status {status}")
            } else {
                trimmed.to_string()
            }
        });
    match status {
        401 | 403 => TunecastError::Authentication(message),
        _ => TunecastError::api(status, title, message),
    }
}

/// Error envelope used by the backend for 4xx/5xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    title: Option<String>,
    message: Option<String>,
    detail: Option<String>,
}
