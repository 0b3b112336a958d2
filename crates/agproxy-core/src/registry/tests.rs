#![allow(clippy::unwrap_used, reason = "test assertions")]

use std::sync::Arc;

use tempfile::TempDir;

use agproxy_types::{Account, AccountError, EventFilter, EventType};

use super::AccountRegistry;
use crate::config_store::ConfigStore;
use crate::events::{EventBroker, EventStore};

fn test_registry() -> (AccountRegistry, Arc<EventStore>, TempDir) {
    let tmp = TempDir::new().unwrap();
    let config = Arc::new(ConfigStore::new(tmp.path()));
    let events = Arc::new(EventStore::new(tmp.path(), config, EventBroker::new()));
    let registry = AccountRegistry::new(tmp.path(), events.clone());
    (registry, events, tmp)
}

#[test]
fn test_add_get_remove() {
    let (registry, _events, _tmp) = test_registry();

    registry.add(Account::new("a@example.com")).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.get("a@example.com").unwrap().enabled);

    let err = registry.add(Account::new("a@example.com")).unwrap_err();
    assert!(matches!(err, AccountError::AlreadyExists { .. }));

    registry.remove("a@example.com").unwrap();
    assert!(registry.is_empty());

    let err = registry.remove("a@example.com").unwrap_err();
    assert!(matches!(err, AccountError::NotFound { .. }));
}

#[test]
fn test_set_enabled_emits_system_event() {
    let (registry, events, _tmp) = test_registry();

    registry.add(Account::new("a@example.com")).unwrap();
    let account = registry.set_enabled("a@example.com", false).unwrap();
    assert!(!account.enabled);

    let page = events.get_events(&EventFilter {
        kind: Some(EventType::System),
        ..Default::default()
    });
    assert!(page.events.iter().any(|e| e.message.contains("disabled by operator")));
}

#[test]
fn test_pool_round_trips_health_records() {
    let tmp = TempDir::new().unwrap();
    let config = Arc::new(ConfigStore::new(tmp.path()));
    let events = Arc::new(EventStore::new(tmp.path(), config, EventBroker::new()));

    {
        let registry = AccountRegistry::new(tmp.path(), events.clone());
        registry.add(Account::new("a@example.com")).unwrap();
        registry.with_account_mut("a@example.com", |account| {
            let record = account.health_record_mut("gemini-3-pro");
            record.success_count = 7;
            record.fail_count = 2;
            record.recalculate_score();
        });
        assert!(registry.save_if_dirty());
    }

    let reloaded = AccountRegistry::new(tmp.path(), events);
    let account = reloaded.get("a@example.com").unwrap();
    let record = account.health_record("gemini-3-pro").unwrap();
    assert_eq!(record.success_count, 7);
    assert_eq!(record.fail_count, 2);
}

#[test]
fn test_reload_replaces_in_memory_state() {
    let (registry, _events, _tmp) = test_registry();

    registry.add(Account::new("a@example.com")).unwrap();
    registry.add(Account::new("b@example.com")).unwrap();

    // Mutate without persisting, then reload from the last saved state
    registry.with_account_mut("a@example.com", |account| {
        account.health_record_mut("gemini-3-pro").fail_count = 9;
    });
    assert_eq!(registry.reload(), 2);

    let account = registry.get("a@example.com").unwrap();
    assert!(account.health_record("gemini-3-pro").is_none());
}

#[test]
fn test_tracked_model_ids_deduped_and_sorted() {
    let (registry, _events, _tmp) = test_registry();

    registry.add(Account::new("a@example.com")).unwrap();
    registry.add(Account::new("b@example.com")).unwrap();
    registry.with_account_mut("a@example.com", |account| {
        account.health_record_mut("gemini-3-pro");
        account.health_record_mut("gemini-3-flash");
    });
    registry.with_account_mut("b@example.com", |account| {
        account.health_record_mut("gemini-3-pro");
    });

    assert_eq!(registry.tracked_model_ids(), vec!["gemini-3-flash", "gemini-3-pro"]);
}

#[test]
fn test_corrupt_account_file_yields_empty_pool() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("accounts.json"), "not json").unwrap();

    let config = Arc::new(ConfigStore::new(tmp.path()));
    let events = Arc::new(EventStore::new(tmp.path(), config, EventBroker::new()));
    let registry = AccountRegistry::new(tmp.path(), events);
    assert!(registry.is_empty());
}
