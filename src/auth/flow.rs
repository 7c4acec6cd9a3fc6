use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::AuthError;
use super::navigator::{BrowserNavigator, Navigator};
use super::session::{now_ms, SessionRecord};
use super::store::SessionStore;

const LOGIN_PATH: &str = "/oauth/login";
const CALLBACK_PATH: &str = "/oauth/login-callback";
const REFRESH_PATH: &str = "/oauth/token-refresh";

/// Outcome of a login, callback, or refresh round trip.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// A session was established and written to the store.
    Authenticated { record: SessionRecord },
    /// The backend demands provider consent. Navigation to `url` has been
    /// issued through the [`Navigator`], at most once per flow.
    RedirectRequired {
        url: String,
        user_id: Option<String>,
    },
}

/// Coordinates the three-step identity flow against the backend.
///
/// Each operation is a single round trip whose duck-typed answer is decoded
/// into a [`FlowOutcome`]; anything that is neither a redirect nor a
/// complete credential raises [`AuthError::MalformedResponse`] and writes
/// nothing.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tunecast::auth::{MemorySessionStore, OAuthFlow};
///
/// # async fn example() -> Result<(), tunecast::auth::AuthError> {
/// let store = Arc::new(MemorySessionStore::new());
/// let flow = OAuthFlow::new("https://backend.example/api", store);
/// let outcome = flow.login("google-id-token").await?;
/// # Ok(())
/// # }
/// ```
pub struct OAuthFlow {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    redirect_issued: AtomicBool,
    consumed_codes: Mutex<HashSet<String>>,
}

impl OAuthFlow {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            navigator: Arc::new(BrowserNavigator),
            redirect_issued: AtomicBool::new(false),
            consumed_codes: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Exchange a provider-issued identity credential for a session.
    pub async fn login(&self, provider_credential: &str) -> Result<FlowOutcome, AuthError> {
        debug!("exchanging provider credential for a session");
        let response = self
            .post(
                LOGIN_PATH,
                &serde_json::json!({ "credential": provider_credential }),
            )
            .await?;
        self.normalize(response, EmailPolicy::Required)
    }

    /// Complete the provider's redirect-based consent flow.
    ///
    /// An authorization code is marked consumed the moment its exchange
    /// starts, so a re-dispatched callback (a re-rendered handler, a
    /// double-fired effect) fails with [`AuthError::CodeConsumed`] without
    /// touching the backend.
    pub async fn exchange_callback(
        &self,
        code: &str,
        user_id: &str,
        user_email: Option<&str>,
    ) -> Result<FlowOutcome, AuthError> {
        if !self.consumed_codes.lock().unwrap().insert(code.to_string()) {
            debug!("authorization code already consumed, skipping exchange");
            return Err(AuthError::CodeConsumed);
        }
        let response = self
            .post(
                CALLBACK_PATH,
                &serde_json::json!({
                    "code": code,
                    "user_id": user_id,
                    "user_email": user_email,
                }),
            )
            .await?;
        self.normalize(response, EmailPolicy::Required)
    }

    /// Request a new credential for an already-known principal.
    ///
    /// A redirect answer means the principal's consent has lapsed; it is
    /// surfaced as [`FlowOutcome::RedirectRequired`], not as a failure.
    pub async fn refresh(&self, user_id: &str) -> Result<FlowOutcome, AuthError> {
        debug!(user_id, "refreshing session credential");
        let response = self
            .post(REFRESH_PATH, &serde_json::json!({ "user_id": user_id }))
            .await?;
        self.normalize(response, EmailPolicy::ReuseStored)
    }

    /// Forget consumed authorization codes and re-arm the redirect latch.
    ///
    /// For hosts that abandon a flow and start over (e.g. the user backed
    /// out of the consent screen).
    pub fn reset_flow_latches(&self) {
        self.consumed_codes.lock().unwrap().clear();
        self.redirect_issued.store(false, Ordering::SeqCst);
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<AuthResponse, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: if message.trim().is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }
        Ok(resp.json().await?)
    }

    /// Decode the duck-typed backend answer into a tagged outcome.
    fn normalize(
        &self,
        response: AuthResponse,
        email: EmailPolicy,
    ) -> Result<FlowOutcome, AuthError> {
        let AuthResponse {
            redirect,
            oauth_url,
            user_id,
            jwt,
            expires_in,
            user_email,
        } = response;
        let principal_id = decode_user_id(user_id);

        if redirect.unwrap_or(false) {
            let url = oauth_url.ok_or_else(|| {
                AuthError::MalformedResponse("redirect answer without an oauth_url".to_string())
            })?;
            self.issue_redirect(&url);
            return Ok(FlowOutcome::RedirectRequired {
                url,
                user_id: principal_id,
            });
        }

        let (Some(jwt), Some(expires_in), Some(user_id)) = (jwt, expires_in, principal_id) else {
            return Err(AuthError::MalformedResponse(
                "answer carries neither a redirect nor a complete credential".to_string(),
            ));
        };
        let user_email = match email {
            EmailPolicy::Required => user_email.ok_or_else(|| {
                AuthError::MalformedResponse("authenticated answer missing user_email".to_string())
            })?,
            EmailPolicy::ReuseStored => match user_email {
                Some(value) => value,
                None => self
                    .store
                    .load()?
                    .map(|record| record.user_email)
                    .unwrap_or_default(),
            },
        };

        let record =
            SessionRecord::from_expires_in(jwt, expires_in, now_ms(), user_id, user_email);
        self.store.save(&record)?;
        // An authenticated outcome starts a new logical flow.
        self.redirect_issued.store(false, Ordering::SeqCst);
        Ok(FlowOutcome::Authenticated { record })
    }

    fn issue_redirect(&self, url: &str) {
        if self.redirect_issued.swap(true, Ordering::SeqCst) {
            debug!("redirect already in flight, skipping duplicate navigation");
            return;
        }
        warn!("backend requires provider consent, navigating to {url}");
        self.navigator.navigate(url);
    }
}

/// Wire shape shared by the three auth endpoints. All fields are optional;
/// which ones are present decides the outcome.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    redirect: Option<bool>,
    oauth_url: Option<String>,
    user_id: Option<serde_json::Value>,
    jwt: Option<String>,
    expires_in: Option<i64>,
    user_email: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum EmailPolicy {
    /// Login and callback answers must name the principal's email.
    Required,
    /// Refresh answers may omit it; the stored one is carried over.
    ReuseStored,
}

/// The backend emits `user_id` both as a number and as a string.
fn decode_user_id(value: Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
