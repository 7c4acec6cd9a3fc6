#![allow(dead_code)]

use std::sync::Mutex;

use chrono::Utc;
use tunecast::auth::{Navigator, SessionRecord};

/// Captures consent navigations instead of opening a browser.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().expect("navigator lock poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visits
            .lock()
            .expect("navigator lock poisoned")
            .push(url.to_string());
    }
}

pub fn record_expiring_at(credential: &str, expires_at: &str) -> SessionRecord {
    SessionRecord {
        credential: credential.to_string(),
        expires_at: expires_at.to_string(),
        user_id: "user-1".to_string(),
        user_email: "user@example.com".to_string(),
    }
}

pub fn fresh_record(credential: &str) -> SessionRecord {
    let expiry = Utc::now().timestamp_millis() + 3_600_000;
    record_expiring_at(credential, &expiry.to_string())
}

pub fn expired_record(credential: &str) -> SessionRecord {
    let expiry = Utc::now().timestamp_millis() - 1_000;
    record_expiring_at(credential, &expiry.to_string())
}
