use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::accounts::{
    get_account_health, list_accounts, reset_account_health, set_account_enabled,
    toggle_account_model, ResetHealthRequest, SetEnabledRequest, ToggleModelRequest,
};
use crate::test_helpers::{test_app_state, test_app_state_with_accounts};

#[tokio::test]
async fn test_list_accounts_empty() {
    let (state, _tmp) = test_app_state();
    let Json(response) = list_accounts(State(state)).await;
    assert!(response.accounts.is_empty());
}

#[tokio::test]
async fn test_list_accounts_sorted_with_tracked_models() {
    let (state, _tmp) = test_app_state_with_accounts(&["b@example.com", "a@example.com"]);
    state.tracker().record_result("b@example.com", "gemini-3-pro", true, None);

    let Json(response) = list_accounts(State(state)).await;
    assert_eq!(response.accounts.len(), 2);
    assert_eq!(response.accounts[0].email, "a@example.com");
    assert_eq!(response.accounts[1].tracked_models, vec!["gemini-3-pro"]);
}

#[tokio::test]
async fn test_set_enabled_unknown_account() {
    let (state, _tmp) = test_app_state();
    let result = set_account_enabled(
        State(state),
        Path("ghost@example.com".to_string()),
        Json(SetEnabledRequest { enabled: false }),
    )
    .await;

    assert_eq!(result.unwrap_err().0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_enabled_round_trip() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);

    let Json(response) = set_account_enabled(
        State(state.clone()),
        Path("a@example.com".to_string()),
        Json(SetEnabledRequest { enabled: false }),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert!(!response.enabled);
    assert!(!state.registry().get("a@example.com").unwrap().enabled);
}

#[tokio::test]
async fn test_account_health_404_and_snapshot() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);

    let err = get_account_health(State(state.clone()), Path("ghost@example.com".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);

    state.tracker().record_result("a@example.com", "gemini-3-pro", false, None);
    let Json(response) =
        get_account_health(State(state), Path("a@example.com".to_string())).await.unwrap();
    assert_eq!(response.health["gemini-3-pro"].fail_count, 1);
}

#[tokio::test]
async fn test_toggle_model_sets_manual_disable() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);

    let Json(response) = toggle_account_model(
        State(state.clone()),
        Path(("a@example.com".to_string(), "gemini-3-pro".to_string())),
        Json(ToggleModelRequest { enabled: false }),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert!(response.health.manual_disabled);
    assert!(!state.tracker().is_model_usable("a@example.com", "gemini-3-pro"));
}

#[tokio::test]
async fn test_reset_health_single_model() {
    let (state, _tmp) = test_app_state_with_accounts(&["a@example.com"]);
    state.tracker().record_result("a@example.com", "gemini-3-pro", false, None);

    let Json(response) = reset_account_health(
        State(state.clone()),
        Path("a@example.com".to_string()),
        Some(Json(ResetHealthRequest { model_id: Some("gemini-3-pro".to_string()) })),
    )
    .await
    .unwrap();

    assert!(response.success);
    let record = state.tracker().record_snapshot("a@example.com", "gemini-3-pro").unwrap();
    assert_eq!(record.fail_count, 0);
    assert_eq!(record.health_score, 100.0);
}
