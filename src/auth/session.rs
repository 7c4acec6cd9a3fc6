use serde::{Deserialize, Serialize};

/// The single durable session entity: a bearer credential, its expiry, and
/// the authenticated principal.
///
/// `expires_at` is kept in its stored form — epoch milliseconds as a
/// string. A value that does not parse is treated as already expired,
/// never as "never expires".
///
/// # Example
/// ```
/// use tunecast::auth::SessionRecord;
///
/// let record = SessionRecord::from_expires_in(
///     "jwt".to_string(),
///     3600,
///     1_700_000_000_000,
///     "user-1".to_string(),
///     "user@example.com".to_string(),
/// );
/// assert_eq!(record.expires_at, "1700003600000");
/// assert!(!record.is_expired_at(1_700_000_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub credential: String,
    pub expires_at: String,
    pub user_id: String,
    pub user_email: String,
}

impl SessionRecord {
    /// Build a record for a credential that expires `expires_in_secs`
    /// seconds after `now_ms`.
    pub fn from_expires_in(
        credential: String,
        expires_in_secs: i64,
        now_ms: i64,
        user_id: String,
        user_email: String,
    ) -> Self {
        Self {
            credential,
            expires_at: (now_ms + expires_in_secs * 1000).to_string(),
            user_id,
            user_email,
        }
    }

    /// Parsed expiry in epoch milliseconds, if well-formed.
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.expires_at.trim().parse().ok()
    }

    /// Whether the credential must not be used at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at_ms() {
            Some(expiry) => now_ms >= expiry,
            None => true,
        }
    }

    /// Whether the credential must not be used right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_ms())
    }
}

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
