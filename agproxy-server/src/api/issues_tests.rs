use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use agproxy_types::IssueStatus;

use super::issues::{
    acknowledge_issue, get_issue_stats, list_issues, list_open_issues, resolve_issue, IssueQuery,
};
use crate::test_helpers::test_app_state_with_accounts;

#[tokio::test]
async fn test_list_issues_empty() {
    let (state, _tmp) = test_app_state_with_accounts(&[]);
    let Json(response) = list_issues(State(state), Query(IssueQuery::default())).await;
    assert!(response.issues.is_empty());
}

#[tokio::test]
async fn test_auth_failure_shows_up_as_open_issue() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);
    state.events().record_auth_failure("a@example.com", "token revoked", None);

    let Json(response) = list_open_issues(State(state.clone())).await;
    assert_eq!(response.issues.len(), 1);
    assert_eq!(response.issues[0].status, IssueStatus::Active);

    let Json(stats) = get_issue_stats(State(state)).await;
    assert_eq!(stats.active, 1);
}

#[tokio::test]
async fn test_unknown_issue_is_404() {
    let (state, _tmp) = test_app_state_with_accounts(&[]);
    let err = resolve_issue(State(state), Path(Uuid::new_v4())).await.unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_acknowledge_then_resolve_then_conflict() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);
    state.events().record_auth_failure("a@example.com", "token revoked", None);
    let id = state.issues().list(None)[0].id;

    let Json(acked) = acknowledge_issue(State(state.clone()), Path(id)).await.unwrap();
    assert_eq!(acked.issue.status, IssueStatus::Acknowledged);

    let Json(resolved) = resolve_issue(State(state.clone()), Path(id)).await.unwrap();
    assert_eq!(resolved.issue.status, IssueStatus::Resolved);

    let err = resolve_issue(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err.0, StatusCode::CONFLICT);
}
