//! End-to-end session tests against a mock provider and an on-disk history
//!
//! These tests verify:
//! - History persistence across sessions
//! - Last-dispatch-wins with out-of-order responses
//! - Map synchronization following the current record

use std::time::Duration;

use ip_locator::config::{HISTORY_CAPACITY, HISTORY_SLOT_KEY, OVERLAY_RADIUS_METERS};
use ip_locator::{
    Applied, CommandQueue, HistoryEntry, HistoryStore, IpInfoClient, JsonFileStore, MapCommand,
    MapSynchronizer, Session, SessionState,
};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type FileSession = Session<IpInfoClient, JsonFileStore<Vec<HistoryEntry>>>;

async fn mock_provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Brisbane",
            "country": "AU",
            "loc": "-27.4679,153.0281"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/8.8.8.8/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "8.8.8.8",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.386,-122.0838",
            "org": "AS15169 Google LLC"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1.1.1/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "ip": "1.1.1.1",
                    "city": "Sydney",
                    "loc": "-33.8688,151.2093"
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/9.9.9.9/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "9.9.9.9",
            "loc": "not a coordinate"
        })))
        .mount(&server)
        .await;
    server
}

fn open_session(server: &MockServer, dir: &TempDir) -> FileSession {
    let locator = IpInfoClient::new(Arc::new(reqwest::Client::new()), &server.uri(), None)
        .expect("mock server URI is a valid base");
    let history = HistoryStore::open(JsonFileStore::new(dir.path(), HISTORY_SLOT_KEY));
    Session::new(locator, history)
}

#[tokio::test]
async fn test_history_survives_new_session() {
    let server = mock_provider().await;
    let dir = TempDir::new().expect("Failed to create temp directory");

    {
        let mut session = open_session(&server, &dir);
        session.start().await;
        session.search("8.8.8.8").await.expect("valid address");
        session.search("9.9.9.9").await.expect("valid address");
        assert_eq!(session.history().len(), 2);
    }

    let session = open_session(&server, &dir);
    let ips: Vec<&str> = session.history().iter().map(|e| e.ip.as_str()).collect();
    assert_eq!(ips, vec!["9.9.9.9", "8.8.8.8"]);
    assert_eq!(
        session.history()[1].data.org.as_deref(),
        Some("AS15169 Google LLC")
    );
    // the self-lookup never enters history
    assert!(session.history().iter().all(|e| e.ip != "203.0.113.7"));
}

#[tokio::test]
async fn test_corrupt_history_file_starts_empty() {
    let server = mock_provider().await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(dir.path().join("ipHistory_v1.json"), "{not json").unwrap();

    let mut session = open_session(&server, &dir);
    assert!(session.history().is_empty());

    session.search("8.8.8.8").await.expect("valid address");
    let raw = std::fs::read_to_string(dir.path().join("ipHistory_v1.json")).unwrap();
    let stored: Vec<HistoryEntry> = serde_json::from_str(&raw).expect("rewritten as valid JSON");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_later_dispatch_wins_over_slower_earlier_one() {
    let server = mock_provider().await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut session = open_session(&server, &dir);

    let slow = session.dispatch_search("1.1.1.1").expect("valid address");
    let fast = session.dispatch_search("8.8.8.8").expect("valid address");
    let locator = session.locator().clone();

    let (slow_outcome, fast_outcome) = tokio::join!(slow.resolve(&locator), fast.resolve(&locator));

    let applied = session.apply(fast_outcome);
    assert_eq!(
        applied.record().and_then(|r| r.ip.as_deref()),
        Some("8.8.8.8")
    );
    assert_eq!(session.apply(slow_outcome), Applied::Stale);

    assert_eq!(
        session.current().and_then(|r| r.ip.as_deref()),
        Some("8.8.8.8")
    );
    let ips: Vec<&str> = session.history().iter().map(|e| e.ip.as_str()).collect();
    assert_eq!(ips, vec!["8.8.8.8"]);
}

#[tokio::test]
async fn test_map_follows_current_record() {
    let server = mock_provider().await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut session = open_session(&server, &dir);
    let mut map = MapSynchronizer::new(CommandQueue::new());
    let mut current = session.subscribe_current();

    session.start().await;
    assert!(current.has_changed().unwrap());
    let record = current.borrow_and_update().clone().expect("self record");
    assert!(map.sync(&record));

    session.search("8.8.8.8").await.expect("valid address");
    let record = current.borrow_and_update().clone().expect("search record");
    assert!(map.sync(&record));

    let commands = map.surface().commands();
    let overlays_added = commands
        .iter()
        .filter(|c| matches!(c, MapCommand::AddOverlayCircle { .. }))
        .count();
    let overlays_removed = commands
        .iter()
        .filter(|c| **c == MapCommand::RemoveOverlayCircle)
        .count();
    assert_eq!(overlays_added - overlays_removed, 1);
    assert_eq!(
        commands.last(),
        Some(&MapCommand::AddOverlayCircle {
            lat: 37.386,
            lon: -122.0838,
            radius_meters: OVERLAY_RADIUS_METERS
        })
    );

    // unparsable loc: marker stays, overlay goes
    session.search("9.9.9.9").await.expect("valid address");
    let record = current.borrow_and_update().clone().expect("search record");
    map.surface_mut().drain();
    assert!(!map.sync(&record));
    assert_eq!(map.surface().commands(), &[MapCommand::RemoveOverlayCircle]);
    assert!(map.marker().is_some());
    assert!(!map.has_overlay());
}

#[tokio::test]
async fn test_provider_failure_keeps_current_record() {
    let server = mock_provider().await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut session = open_session(&server, &dir);

    session.start().await;
    // no mock for this address: wiremock answers 404
    let applied = session.search("4.4.4.4").await.expect("valid address");

    assert_eq!(
        applied,
        Applied::Failed("lookup provider returned HTTP 404".to_string())
    );
    assert!(matches!(session.state(), SessionState::Error(_)));
    assert_eq!(
        session.current().and_then(|r| r.ip.as_deref()),
        Some("203.0.113.7")
    );
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_history_is_capped() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut history = HistoryStore::open(JsonFileStore::new(dir.path(), HISTORY_SLOT_KEY));
    for i in 0..=HISTORY_CAPACITY {
        let ip = format!("10.0.0.{i}");
        history.record_lookup(HistoryEntry::new(ip, Default::default()));
    }

    let reopened = HistoryStore::open(JsonFileStore::new(dir.path(), HISTORY_SLOT_KEY));
    let entries = reopened.entries();
    assert_eq!(entries.len(), HISTORY_CAPACITY);
    assert_eq!(entries[0].ip, format!("10.0.0.{HISTORY_CAPACITY}"));
    assert!(entries.iter().all(|e| e.ip != "10.0.0.0"));
}
