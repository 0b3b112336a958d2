//! Route preview handler
//!
//! Lets operators (and the translation layer) ask which account would serve
//! a model right now. An empty pool answers 503 with the stable reason code
//! the clients of the proxy surface see.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct PickQuery {
    pub model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickResponse {
    pub email: String,
    pub upstream_model: String,
}

pub async fn pick_account(
    State(state): State<AppState>,
    Query(query): Query<PickQuery>,
) -> Response {
    match state.router().pick_account(&query.model) {
        Ok(selection) => Json(PickResponse {
            email: selection.email,
            upstream_model: selection.upstream_model,
        })
        .into_response(),
        Err(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": error.to_string(),
                "reason": error.reason_code(),
            })),
        )
            .into_response(),
    }
}
