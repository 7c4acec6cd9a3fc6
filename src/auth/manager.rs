use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use super::error::AuthError;
use super::flow::{FlowOutcome, OAuthFlow};
use super::store::SessionStore;

type RefreshHandle = Shared<BoxFuture<'static, Result<Option<String>, AuthError>>>;

/// Owns the session lifecycle: hands out the stored credential while it is
/// fresh, refreshes it through the [`OAuthFlow`] when it has expired, and
/// clears the session when a refresh cannot recover it.
///
/// At most one refresh is in flight at a time. Concurrent callers that each
/// detect expiry await the same shared future, so N simultaneous calls issue
/// exactly one backend refresh.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tunecast::auth::{MemorySessionStore, OAuthFlow, SessionManager};
///
/// # async fn example() -> Result<(), tunecast::auth::AuthError> {
/// let store = Arc::new(MemorySessionStore::new());
/// let flow = Arc::new(OAuthFlow::new("https://backend.example/api", store.clone()));
/// let sessions = SessionManager::new(store, flow);
/// match sessions.valid_credential().await? {
///     Some(jwt) => println!("bearer {jwt}"),
///     None => println!("login required"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    flow: Arc<OAuthFlow>,
    in_flight: Mutex<Option<RefreshHandle>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, flow: Arc<OAuthFlow>) -> Self {
        Self {
            store,
            flow,
            in_flight: Mutex::new(None),
        }
    }

    /// Return a credential that is valid right now, refreshing if needed.
    ///
    /// No stored session yields `Ok(None)` without touching the network. A
    /// fresh credential is returned as-is. An expired one triggers a
    /// single-flight refresh; if the refresh fails or the backend demands
    /// fresh consent, the session is cleared and `Ok(None)` is returned —
    /// the caller decides whether to start a new login.
    pub async fn valid_credential(&self) -> Result<Option<String>, AuthError> {
        let record = match self.store.load()? {
            Some(record) => record,
            None => {
                debug!("no stored session");
                return Ok(None);
            }
        };
        if !record.is_expired() {
            return Ok(Some(record.credential));
        }
        debug!(user_id = %record.user_id, "stored credential expired, refreshing");
        self.refresh_single_flight(record.user_id).await
    }

    /// Drop the current session. Safe to call when none exists.
    pub fn invalidate(&self) -> Result<(), AuthError> {
        debug!("invalidating session");
        self.store.clear()
    }

    async fn refresh_single_flight(&self, user_id: String) -> Result<Option<String>, AuthError> {
        let (handle, initiated) = {
            let mut slot = self.in_flight.lock().expect("refresh slot poisoned");
            match slot.as_ref() {
                Some(existing) => (existing.clone(), false),
                None => {
                    let store = self.store.clone();
                    let flow = self.flow.clone();
                    let handle = run_refresh(store, flow, user_id).boxed().shared();
                    *slot = Some(handle.clone());
                    (handle, true)
                }
            }
        };
        let result = handle.await;
        if initiated {
            *self.in_flight.lock().expect("refresh slot poisoned") = None;
        }
        result
    }
}

async fn run_refresh(
    store: Arc<dyn SessionStore>,
    flow: Arc<OAuthFlow>,
    user_id: String,
) -> Result<Option<String>, AuthError> {
    match flow.refresh(&user_id).await {
        Ok(FlowOutcome::Authenticated { record }) => Ok(Some(record.credential)),
        Ok(FlowOutcome::RedirectRequired { url, .. }) => {
            // Consent lapsed. The flow already navigated; the stale session
            // must not linger or every caller would re-trigger this path.
            warn!(%url, "refresh requires provider consent, clearing session");
            clear_session(&store);
            Ok(None)
        }
        Err(err) => {
            warn!("credential refresh failed: {err}");
            clear_session(&store);
            Ok(None)
        }
    }
}

fn clear_session(store: &Arc<dyn SessionStore>) {
    if let Err(err) = store.clear() {
        warn!("failed to clear session after refresh failure: {err}");
    }
}
