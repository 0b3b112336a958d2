use axum::extract::{Query, State};
use axum::response::Json;

use agproxy_types::{EventFilter, EventType};

use super::events::{clear_events, get_event_stats, get_events, StatsQuery};
use crate::test_helpers::test_app_state_with_accounts;

#[tokio::test]
async fn test_get_events_empty() {
    let (state, _tmp) = test_app_state_with_accounts(&[]);
    let Json(page) = get_events(State(state), Query(EventFilter::default())).await;
    assert_eq!(page.total, 0);
    assert!(page.events.is_empty());
}

#[tokio::test]
async fn test_get_events_filtered_by_type() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);
    state.events().record_request("a@example.com", "gemini-3-pro", true, None, None);
    state.events().record_rate_limit("a@example.com", "gemini-3-pro", Some(60), None);

    let Json(page) = get_events(
        State(state),
        Query(EventFilter { kind: Some(EventType::RateLimit), ..Default::default() }),
    )
    .await;

    assert_eq!(page.total, 1);
    assert_eq!(page.events[0].kind, EventType::RateLimit);
}

#[tokio::test]
async fn test_stats_success_rate_through_handler() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);
    state.events().record_request("a@example.com", "gemini-3-pro", true, None, None);
    state.events().record_request("a@example.com", "gemini-3-pro", true, None, None);
    state.events().record_request("a@example.com", "gemini-3-pro", false, None, None);

    let Json(stats) = get_event_stats(
        State(state),
        Query(StatsQuery { since: Some(0), ..Default::default() }),
    )
    .await;

    assert_eq!(stats.requests.success_rate, 66.7);
}

#[tokio::test]
async fn test_stats_scoped_to_account() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com", "b@example.com"]);
    state.events().record_request("a@example.com", "gemini-3-pro", true, None, None);
    state.events().record_request("b@example.com", "gemini-3-pro", false, None, None);

    let Json(stats) = get_event_stats(
        State(state),
        Query(StatsQuery { account: Some("a@example.com".to_string()), ..Default::default() }),
    )
    .await;

    assert_eq!(stats.requests.total, 1);
    assert_eq!(stats.requests.success_rate, 100.0);
}

#[tokio::test]
async fn test_clear_reports_dropped_count() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);
    state.events().record_request("a@example.com", "gemini-3-pro", true, None, None);
    state.events().record_request("a@example.com", "gemini-3-pro", true, None, None);

    let Json(response) = clear_events(State(state.clone())).await;
    assert!(response.success);
    assert_eq!(response.cleared, 2);
    assert_eq!(state.events().count(), 0);
}
