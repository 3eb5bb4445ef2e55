//! End-to-end merge protocol tests: GuestStore + MergeEngine + ApiClient
//! against a mock server.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfmark_core::{
    ApiClient, Config, Entry, GuestStore, MediaItem, MediaType, MergeEngine, MergeError,
    MergePhase, Status,
};

fn test_store(temp_dir: &TempDir, api_url: String) -> GuestStore {
    GuestStore::with_config(Config {
        data_dir: temp_dir.path().to_path_buf(),
        api_url,
    })
}

fn add_book(store: &GuestStore, title: &str) -> Entry {
    let media = MediaItem::new(MediaType::Book, title);
    let entry = Entry::new(media.id, Status::Planned);
    store.add_entry(&entry, &media).unwrap();
    store.get_entry(entry.id).unwrap()
}

// ── Success path ────────────────────────────────────────────────

#[tokio::test]
async fn merge_success_clears_guest_state_and_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/guest/merge"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Guest data merged successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = test_store(&temp_dir, server.uri());
    add_book(&store, "Dune");
    add_book(&store, "Solaris");
    let original_device = store.device_id();

    let client = ApiClient::new(server.uri()).unwrap();
    let mut engine = MergeEngine::new();
    let outcome = engine.merge(&store, &client, "tok-1").await.unwrap();

    assert_eq!(outcome.merged_entries, 2);
    assert_eq!(engine.phase(), MergePhase::Authenticated);
    assert!(store.is_empty());
    assert!(store.identity().peek().is_none());
    assert_ne!(store.device_id(), original_device);
}

#[tokio::test]
async fn second_merge_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/guest/merge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = test_store(&temp_dir, server.uri());
    add_book(&store, "Dune");

    let client = ApiClient::new(server.uri()).unwrap();
    let mut engine = MergeEngine::new();
    engine.merge(&store, &client, "tok-1").await.unwrap();

    // Double-submit: the entries no longer exist locally, so the mock's
    // expect(1) holds and the outcome is empty.
    let outcome = engine.merge(&store, &client, "tok-1").await.unwrap();
    assert_eq!(outcome.merged_entries, 0);
}

// ── Failure path ────────────────────────────────────────────────

#[tokio::test]
async fn merge_rejection_retains_guest_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/guest/merge"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = test_store(&temp_dir, server.uri());
    add_book(&store, "Dune");
    let before = store.guest_data();

    let client = ApiClient::new(server.uri()).unwrap();
    let mut engine = MergeEngine::new();
    let err = engine.merge(&store, &client, "tok-1").await.unwrap_err();

    match err {
        MergeError::Submit(api_err) => {
            assert_eq!(api_err.status().map(|s| s.as_u16()), Some(500));
            assert!(api_err.to_string().contains("database unavailable"));
        }
        other => panic!("expected Submit error, got {:?}", other),
    }
    assert_eq!(engine.phase(), MergePhase::Guest);
    assert_eq!(store.guest_data(), before);
}

#[tokio::test]
async fn network_failure_retains_guest_state() {
    // Point the client at a server that is already shut down
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let temp_dir = TempDir::new().unwrap();
    let store = test_store(&temp_dir, uri.clone());
    add_book(&store, "Dune");
    let before = store.guest_data();

    let client = ApiClient::new(uri).unwrap();
    let mut engine = MergeEngine::new();
    let result = engine.merge(&store, &client, "tok-1").await;

    assert!(matches!(result, Err(MergeError::Submit(_))));
    assert_eq!(engine.phase(), MergePhase::Guest);
    assert_eq!(store.guest_data(), before);
}
