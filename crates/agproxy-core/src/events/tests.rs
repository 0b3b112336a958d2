#![allow(clippy::unwrap_used, reason = "test assertions")]

use std::sync::Arc;

use tempfile::TempDir;

use agproxy_types::{
    EventDraft, EventFilter, EventSeverity, EventType, HealthChange, HealthConfigPatch,
};

use super::broker::StreamFrame;
use super::{EventBroker, EventStore};
use crate::config_store::ConfigStore;

fn test_store() -> (Arc<EventStore>, Arc<EventBroker>, TempDir) {
    let (store, broker, _config, tmp) = test_store_with_config();
    (store, broker, tmp)
}

fn test_store_with_config() -> (Arc<EventStore>, Arc<EventBroker>, Arc<ConfigStore>, TempDir) {
    let tmp = TempDir::new().unwrap();
    let config = Arc::new(ConfigStore::new(tmp.path()));
    let broker = EventBroker::new();
    let store = Arc::new(EventStore::new(tmp.path(), config.clone(), broker.clone()));
    (store, broker, config, tmp)
}

#[test]
fn test_record_populates_id_and_timestamp() {
    let (store, _broker, _tmp) = test_store();

    let event = store.record(
        EventType::System,
        EventSeverity::Info,
        "Server started".to_string(),
        EventDraft::default(),
    );

    assert_eq!(event.kind, EventType::System);
    assert!(!event.id.is_nil());
    assert_eq!(store.count(), 1);
}

#[test]
fn test_get_events_filters_and_paginates() {
    let (store, _broker, _tmp) = test_store();

    for i in 0..5 {
        store.record_request("a@example.com", "gemini-3-pro", true, Some(&format!("req-{i}")), None);
    }
    store.record_rate_limit("b@example.com", "gemini-3-pro", Some(30), None);

    let page = store.get_events(&EventFilter {
        account: Some("a@example.com".to_string()),
        ..Default::default()
    });
    assert_eq!(page.total, 5);

    let page = store.get_events(&EventFilter {
        kind: Some(EventType::RateLimit),
        ..Default::default()
    });
    assert_eq!(page.total, 1);
    assert_eq!(page.events[0].account.as_deref(), Some("b@example.com"));

    let page = store.get_events(&EventFilter {
        limit: Some(2),
        offset: Some(1),
        ..Default::default()
    });
    assert_eq!(page.total, 6);
    assert_eq!(page.events.len(), 2);
}

#[test]
fn test_get_events_newest_first() {
    let (store, _broker, _tmp) = test_store();

    store.record_request("a@example.com", "gemini-3-pro", true, Some("first"), None);
    store.record_request("a@example.com", "gemini-3-pro", true, Some("second"), None);

    let page = store.get_events(&EventFilter::default());
    assert_eq!(page.events[0].request_id.as_deref(), Some("second"));
    assert_eq!(page.events[1].request_id.as_deref(), Some("first"));
}

#[test]
fn test_stats_success_rate() {
    let (store, _broker, _tmp) = test_store();

    store.record_request("a@example.com", "gemini-3-pro", true, None, None);
    store.record_request("a@example.com", "gemini-3-pro", true, None, None);
    store.record_request("a@example.com", "gemini-3-pro", false, None, None);

    let stats = store.get_stats(0, None, None);
    assert_eq!(stats.requests.total, 3);
    assert_eq!(stats.requests.success, 2);
    assert_eq!(stats.requests.failed, 1);
    assert_eq!(stats.requests.success_rate, 66.7);
}

#[test]
fn test_stats_empty_window_rate_is_100() {
    let (store, _broker, _tmp) = test_store();
    let stats = store.get_stats(0, None, None);
    assert_eq!(stats.requests.total, 0);
    assert_eq!(stats.requests.success_rate, 100.0);
}

#[test]
fn test_stats_counts_by_type_and_severity() {
    let (store, _broker, _tmp) = test_store();

    store.record_auth_failure("a@example.com", "token revoked", None);
    store.record_rate_limit("a@example.com", "gemini-3-pro", None, None);
    store.record_rate_limit("b@example.com", "gemini-3-flash", None, None);

    let stats = store.get_stats(0, None, None);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_type["rate_limit"], 2);
    assert_eq!(stats.by_type["auth_failure"], 1);
    assert_eq!(stats.by_severity["warn"], 2);
    assert_eq!(stats.by_severity["error"], 1);
    assert_eq!(stats.by_account["a@example.com"], 2);
}

#[test]
fn test_clear_persists_and_returns_count() {
    let (store, _broker, tmp) = test_store();

    store.record_system("one".to_string(), serde_json::Value::Null);
    store.record_system("two".to_string(), serde_json::Value::Null);

    assert_eq!(store.clear(), 2);
    assert_eq!(store.count(), 0);

    let on_disk = std::fs::read_to_string(tmp.path().join("events.json")).unwrap();
    assert_eq!(on_disk, "[]");
}

#[test]
fn test_snapshot_round_trip() {
    let tmp = TempDir::new().unwrap();
    let config = Arc::new(ConfigStore::new(tmp.path()));

    let store = EventStore::new(tmp.path(), config.clone(), EventBroker::new());
    store.record_request("a@example.com", "gemini-3-pro", true, Some("req-1"), Some(420));
    store.record_auth_failure("b@example.com", "expired refresh token", None);
    let before = store.get_events(&EventFilter::default());
    assert!(store.save_if_dirty());

    let reloaded = EventStore::new(tmp.path(), config, EventBroker::new());
    let after = reloaded.get_events(&EventFilter::default());
    assert_eq!(before, after);
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("events.json"), "[{broken").unwrap();

    let config = Arc::new(ConfigStore::new(tmp.path()));
    let store = EventStore::new(tmp.path(), config, EventBroker::new());
    assert_eq!(store.count(), 0);
}

#[test]
fn test_prune_truncates_to_max_count() {
    let (store, _broker, config, _tmp) = test_store_with_config();

    // Shrink the cap to the minimum the config accepts
    config
        .update(&HealthConfigPatch { event_max_count: Some(1000), ..Default::default() })
        .unwrap();

    for _ in 0..1010 {
        store.record_system("tick".to_string(), serde_json::Value::Null);
    }

    assert_eq!(store.prune(), 10);
    assert_eq!(store.count(), 1000);
}

#[tokio::test]
async fn test_subscriber_sees_connected_then_live_events() {
    let (store, broker, _tmp) = test_store();

    let mut sub = broker.subscribe(None);
    let recorded = store.record_system("hello".to_string(), serde_json::Value::Null);

    assert!(matches!(sub.recv().await, Some(StreamFrame::Connected { .. })));
    match sub.recv().await {
        Some(StreamFrame::Event(event)) => assert_eq!(event.id, recorded.id),
        other => panic!("expected live event frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_subscriber_backlog_batch() {
    let (store, broker, _tmp) = test_store();

    for i in 0..10 {
        store.record_system(format!("event {i}"), serde_json::Value::Null);
    }

    let mut sub = broker.subscribe(Some(store.tail(5)));
    let eleventh = store.record_system("event 10".to_string(), serde_json::Value::Null);

    assert!(matches!(sub.recv().await, Some(StreamFrame::Connected { .. })));
    match sub.recv().await {
        Some(StreamFrame::Backlog(events)) => {
            assert_eq!(events.len(), 5);
            assert_eq!(events[4].message, "event 9");
        },
        other => panic!("expected backlog frame, got {other:?}"),
    }
    match sub.recv().await {
        Some(StreamFrame::Event(event)) => assert_eq!(event.id, eleventh.id),
        other => panic!("expected live event frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dropped_subscriber_is_reaped() {
    let (store, broker, _tmp) = test_store();

    let sub = broker.subscribe(None);
    assert_eq!(broker.subscriber_count(), 1);

    drop(sub);
    assert_eq!(broker.subscriber_count(), 0);

    // Broadcasting after the drop must not panic or resurrect anything
    store.record_system("after drop".to_string(), serde_json::Value::Null);
    assert_eq!(broker.subscriber_count(), 0);
}

#[test]
fn test_health_change_severity_mapping() {
    let (store, _broker, _tmp) = test_store();

    let disabled = store.record_health_change(
        "a@example.com",
        "gemini-3-pro",
        HealthChange::Disabled,
        "consecutive_failures",
        Some("5 consecutive failures"),
        0.0,
    );
    assert_eq!(disabled.severity, EventSeverity::Error);
    assert_eq!(disabled.details["status"], "disabled");

    let recovered = store.record_health_change(
        "a@example.com",
        "gemini-3-pro",
        HealthChange::Recovered,
        "auto_recovery_timeout",
        None,
        100.0,
    );
    assert_eq!(recovered.severity, EventSeverity::Info);
    assert_eq!(recovered.details["trigger"], "auto_recovery_timeout");
}

#[test]
fn test_connected_frame_payload_shape() {
    let frame = StreamFrame::Connected { timestamp: chrono::Utc::now() };
    let value: serde_json::Value = serde_json::from_str(&frame.to_payload()).unwrap();
    assert_eq!(value["type"], "connected");
    assert!(value["timestamp"].is_string());
}
