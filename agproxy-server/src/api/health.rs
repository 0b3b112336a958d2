//! Health matrix and configuration handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use agproxy_types::{ConfigError, HealthConfig, HealthConfigPatch, HealthMatrix, HealthSummary};

use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct MatrixQuery {
    /// Comma-separated model ids; defaults to every tracked model
    pub models: Option<String>,
}

#[derive(Serialize)]
pub struct MatrixResponse {
    pub matrix: HealthMatrix,
}

pub async fn get_health_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> Json<MatrixResponse> {
    let models: Vec<String> = match &query.models {
        Some(csv) if !csv.trim().is_empty() => csv
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        _ => state.registry().tracked_model_ids(),
    };

    Json(MatrixResponse { matrix: state.tracker().build_health_matrix(&models) })
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: HealthSummary,
}

pub async fn get_health_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    Json(SummaryResponse { summary: state.tracker().health_summary() })
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub config: HealthConfig,
}

pub async fn get_health_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse { config: state.config().get() })
}

pub async fn update_health_config(
    State(state): State<AppState>,
    Json(patch): Json<HealthConfigPatch>,
) -> Response {
    match state.config().update(&patch) {
        Ok(config) => {
            Json(serde_json::json!({ "status": "ok", "config": config })).into_response()
        },
        Err(ConfigError::Validation { errors }) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "status": "error", "errors": errors })),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
