//! API Routes
//!
//! REST + SSE endpoints consumed by the operator dashboard. Handlers stay
//! thin: parse, call into the core services, serialize. Business decisions
//! (scores, disables, routing) live in `agproxy-core`.

mod accounts;
mod events;
mod health;
mod issues;
mod routing;

#[cfg(test)]
mod accounts_tests;
#[cfg(test)]
mod events_tests;
#[cfg(test)]
mod issues_tests;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // Status
        .route("/status", get(get_status))
        // Accounts
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/reload", post(accounts::reload_accounts))
        .route("/accounts/:email/enabled", post(accounts::set_account_enabled))
        .route("/accounts/:email/health", get(accounts::get_account_health))
        .route("/accounts/:email/health/reset", post(accounts::reset_account_health))
        .route("/accounts/:email/models/:model/toggle", post(accounts::toggle_account_model))
        // Health
        .route("/health/matrix", get(health::get_health_matrix))
        .route("/health/summary", get(health::get_health_summary))
        .route("/health/config", get(health::get_health_config))
        .route("/health/config", post(health::update_health_config))
        // Issues
        .route("/issues", get(issues::list_issues))
        .route("/issues/active", get(issues::list_open_issues))
        .route("/issues/stats", get(issues::get_issue_stats))
        .route("/issues/:id/acknowledge", post(issues::acknowledge_issue))
        .route("/issues/:id/resolve", post(issues::resolve_issue))
        // Routing
        .route("/router/pick", get(routing::pick_account))
        // Events
        .route("/events", get(events::get_events))
        .route("/events", delete(events::clear_events))
        .route("/events/stats", get(events::get_event_stats))
        .route("/events/stream", get(events::stream_events))
        // API fallback: return 404 for unknown API endpoints
        .fallback(api_not_found)
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found"})),
    )
}

// ============ Status ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: String,
    accounts_count: usize,
    event_count: usize,
    stream_subscribers: usize,
    open_issues: usize,
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        accounts_count: state.registry().len(),
        event_count: state.events().count(),
        stream_subscribers: state.broker().subscriber_count(),
        open_issues: state.issues().open().len(),
    })
}
