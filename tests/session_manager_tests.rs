mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tunecast::auth::{MemorySessionStore, OAuthFlow, SessionManager, SessionStore};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{expired_record, fresh_record, RecordingNavigator};

fn manager_with(
    server: &MockServer,
    store: Arc<MemorySessionStore>,
    navigator: Arc<RecordingNavigator>,
) -> SessionManager {
    let flow = Arc::new(OAuthFlow::new(server.uri(), store.clone()).with_navigator(navigator));
    SessionManager::new(store, flow)
}

#[tokio::test]
async fn empty_store_yields_none_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token-refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let manager = manager_with(&server, store, Arc::new(RecordingNavigator::new()));

    assert_eq!(manager.valid_credential().await.unwrap(), None);
}

#[tokio::test]
async fn fresh_credential_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token-refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store.save(&fresh_record("jwt-live")).unwrap();
    let manager = manager_with(&server, store, Arc::new(RecordingNavigator::new()));

    assert_eq!(
        manager.valid_credential().await.unwrap(),
        Some("jwt-live".to_string()),
    );
}

#[tokio::test]
async fn expired_credential_triggers_one_refresh_and_updates_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token-refresh"))
        .and(body_partial_json(json!({ "user_id": "user-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "user-1",
            "jwt": "jwt-new",
            "expires_in": 3600,
            "user_email": "user@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store.save(&expired_record("jwt-stale")).unwrap();
    let manager = manager_with(&server, store.clone(), Arc::new(RecordingNavigator::new()));

    assert_eq!(
        manager.valid_credential().await.unwrap(),
        Some("jwt-new".to_string()),
    );

    let record = store.load().unwrap().expect("refreshed record");
    assert_eq!(record.credential, "jwt-new");
    assert!(!record.is_expired());
}

#[tokio::test]
async fn concurrent_callers_share_a_single_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token-refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(150))
                .set_body_json(json!({
                    "user_id": "user-1",
                    "jwt": "jwt-new",
                    "expires_in": 3600,
                    "user_email": "user@example.com"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store.save(&expired_record("jwt-stale")).unwrap();
    let manager = manager_with(&server, store, Arc::new(RecordingNavigator::new()));

    let (first, second) = tokio::join!(manager.valid_credential(), manager.valid_credential());
    assert_eq!(first.unwrap(), Some("jwt-new".to_string()));
    assert_eq!(second.unwrap(), Some("jwt-new".to_string()));
    // The mock's expect(1) verifies only one backend call was issued.
}

#[tokio::test]
async fn refresh_failure_clears_session_and_stays_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token-refresh"))
        .respond_with(ResponseTemplate::new(500).set_body_string("refresh exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store.save(&expired_record("jwt-stale")).unwrap();
    let manager = manager_with(&server, store.clone(), Arc::new(RecordingNavigator::new()));

    assert_eq!(manager.valid_credential().await.unwrap(), None);
    assert!(store.load().unwrap().is_none());

    // The cleared session means no further refresh attempts.
    assert_eq!(manager.valid_credential().await.unwrap(), None);
}

#[tokio::test]
async fn refresh_network_error_clears_session() {
    // Capture the address, then shut the server down so the refresh call
    // fails at the connection level rather than with an HTTP status.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let store = Arc::new(MemorySessionStore::new());
    store.save(&expired_record("jwt-stale")).unwrap();
    let flow = Arc::new(
        OAuthFlow::new(uri, store.clone()).with_navigator(Arc::new(RecordingNavigator::new())),
    );
    let manager = SessionManager::new(store.clone(), flow);

    assert_eq!(manager.valid_credential().await.unwrap(), None);
    assert!(store.load().unwrap().is_none());
    assert_eq!(manager.valid_credential().await.unwrap(), None);
}

#[tokio::test]
async fn refresh_redirect_clears_session_and_navigates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "redirect": true,
            "oauth_url": "https://accounts.example/consent",
            "user_id": "user-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store.save(&expired_record("jwt-stale")).unwrap();
    let navigator = Arc::new(RecordingNavigator::new());
    let manager = manager_with(&server, store.clone(), navigator.clone());

    assert_eq!(manager.valid_credential().await.unwrap(), None);
    assert!(store.load().unwrap().is_none());
    assert_eq!(navigator.visits(), vec!["https://accounts.example/consent"]);
}

#[tokio::test]
async fn invalidate_is_idempotent() {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::new());
    store.save(&fresh_record("jwt-live")).unwrap();
    let manager = manager_with(&server, store.clone(), Arc::new(RecordingNavigator::new()));

    manager.invalidate().unwrap();
    assert!(store.load().unwrap().is_none());
    manager.invalidate().unwrap();
    assert_eq!(manager.valid_credential().await.unwrap(), None);
}
