use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::auth::SessionStore;
use crate::error::Result;
use crate::http::{session_headers, shared_client, status_to_error};

use super::types::{NewTune, TuneFilters, TunePage};

const TUNES_PATH: &str = "/tunes";

/// Typed client for the tune endpoints.
///
/// Every call attaches the stored bearer credential as-is; freshness is the
/// consumer's job via [`crate::auth::SessionManager`] before the call. A
/// stale credential surfaces as an ordinary authentication error from the
/// backend. No automatic retries.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tunecast::auth::MemorySessionStore;
/// use tunecast::tunes::{TuneFilters, TunesClient};
///
/// # async fn example() -> tunecast::error::Result<()> {
/// let store = Arc::new(MemorySessionStore::new());
/// let tunes = TunesClient::new("https://backend.example/api", store);
/// let page = tunes.list(1, 10, &TuneFilters::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct TunesClient {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl TunesClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client: shared_client().clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Fetch one page of the user's tunes.
    pub async fn list(&self, page: u32, limit: u32, filters: &TuneFilters) -> Result<TunePage> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        query.extend(filters.query_pairs());
        let response = self
            .client
            .get(format!("{}{}", self.base_url, TUNES_PATH))
            .headers(session_headers(self.store.as_ref()))
            .query(&query)
            .send()
            .await?;
        let envelope: Envelope<TunePage> = decode(response).await?;
        Ok(envelope.data)
    }

    /// Create a batch of tunes, instant and scheduled alike.
    ///
    /// Every payload is validated locally first; a single invalid tune fails
    /// the whole batch before anything goes over the wire.
    pub async fn create_batch(&self, tunes: &[NewTune]) -> Result<()> {
        let now = Utc::now();
        for tune in tunes {
            tune.validate(now)?;
        }
        debug!(count = tunes.len(), "creating tune batch");
        let response = self
            .client
            .post(format!("{}{}/batch", self.base_url, TUNES_PATH))
            .headers(session_headers(self.store.as_ref()))
            .json(&tunes)
            .send()
            .await?;
        check_status(response).await
    }

    /// Replace a scheduled tune's payload.
    pub async fn update(&self, id: i64, tune: &NewTune) -> Result<()> {
        debug!(id, "updating tune");
        let response = self
            .client
            .put(format!("{}{}/{id}", self.base_url, TUNES_PATH))
            .headers(session_headers(self.store.as_ref()))
            .json(tune)
            .send()
            .await?;
        check_status(response).await
    }

    /// Delete a scheduled tune.
    pub async fn remove(&self, id: i64) -> Result<()> {
        debug!(id, "removing tune");
        let response = self
            .client
            .delete(format!("{}{}/{id}", self.base_url, TUNES_PATH))
            .headers(session_headers(self.store.as_ref()))
            .send()
            .await?;
        check_status(response).await
    }
}

/// Standard backend success envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    title: Option<String>,
    #[allow(dead_code)]
    message: Option<String>,
    data: T,
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(status_to_error(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_to_error(status.as_u16(), &body))
}
