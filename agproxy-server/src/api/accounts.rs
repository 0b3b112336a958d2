//! Account handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agproxy_types::HealthRecord;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub email: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tracked_models: Vec<String>,
}

#[derive(Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountInfo>,
}

pub async fn list_accounts(State(state): State<AppState>) -> Json<AccountsResponse> {
    let accounts = state
        .registry()
        .list()
        .into_iter()
        .map(|account| {
            let mut tracked_models: Vec<String> = account.health.keys().cloned().collect();
            tracked_models.sort();
            AccountInfo {
                email: account.email,
                enabled: account.enabled,
                project_id: account.project_id,
                source: account.source,
                created_at: account.created_at,
                tracked_models,
            }
        })
        .collect();

    Json(AccountsResponse { accounts })
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub count: usize,
}

pub async fn reload_accounts(State(state): State<AppState>) -> Json<ReloadResponse> {
    let count = state.registry().reload();
    Json(ReloadResponse { success: true, count })
}

#[derive(Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SetEnabledResponse {
    pub success: bool,
    pub enabled: bool,
}

pub async fn set_account_enabled(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<SetEnabledRequest>,
) -> Result<Json<SetEnabledResponse>, (StatusCode, String)> {
    let account = state
        .registry()
        .set_enabled(&email, payload.enabled)
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;

    Ok(Json(SetEnabledResponse { success: true, enabled: account.enabled }))
}

#[derive(Debug, Serialize)]
pub struct AccountHealthResponse {
    pub health: HashMap<String, HealthRecord>,
}

pub async fn get_account_health(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AccountHealthResponse>, (StatusCode, String)> {
    let health = state
        .tracker()
        .account_health(&email)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Account not found: {email}")))?;

    Ok(Json(AccountHealthResponse { health }))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetHealthRequest {
    pub model_id: Option<String>,
}

#[derive(Serialize)]
pub struct ResetHealthResponse {
    pub success: bool,
}

pub async fn reset_account_health(
    State(state): State<AppState>,
    Path(email): Path<String>,
    payload: Option<Json<ResetHealthRequest>>,
) -> Result<Json<ResetHealthResponse>, (StatusCode, String)> {
    let model = payload.as_ref().and_then(|p| p.model_id.as_deref());

    if !state.tracker().reset_health(&email, model) {
        return Err((StatusCode::NOT_FOUND, format!("Account not found: {email}")));
    }

    Ok(Json(ResetHealthResponse { success: true }))
}

#[derive(Deserialize)]
pub struct ToggleModelRequest {
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct ToggleModelResponse {
    pub success: bool,
    pub health: HealthRecord,
}

pub async fn toggle_account_model(
    State(state): State<AppState>,
    Path((email, model)): Path<(String, String)>,
    Json(payload): Json<ToggleModelRequest>,
) -> Result<Json<ToggleModelResponse>, (StatusCode, String)> {
    let health = state
        .tracker()
        .toggle_model(&email, &model, payload.enabled)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Account not found: {email}")))?;

    Ok(Json(ToggleModelResponse { success: true, health }))
}
