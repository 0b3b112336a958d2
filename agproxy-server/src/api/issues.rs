//! Issue handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agproxy_types::{Issue, IssueError, IssueStats, IssueStatus};

use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct IssueQuery {
    pub status: Option<IssueStatus>,
}

#[derive(Serialize)]
pub struct IssuesResponse {
    pub issues: Vec<Issue>,
}

pub async fn list_issues(
    State(state): State<AppState>,
    Query(query): Query<IssueQuery>,
) -> Json<IssuesResponse> {
    Json(IssuesResponse { issues: state.issues().list(query.status) })
}

pub async fn list_open_issues(State(state): State<AppState>) -> Json<IssuesResponse> {
    Json(IssuesResponse { issues: state.issues().open() })
}

pub async fn get_issue_stats(State(state): State<AppState>) -> Json<IssueStats> {
    Json(state.issues().stats())
}

#[derive(Debug, Serialize)]
pub struct IssueActionResponse {
    pub success: bool,
    pub issue: Issue,
}

pub async fn acknowledge_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueActionResponse>, (StatusCode, String)> {
    let issue = state.issues().acknowledge(id).map_err(issue_error_status)?;
    Ok(Json(IssueActionResponse { success: true, issue }))
}

pub async fn resolve_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueActionResponse>, (StatusCode, String)> {
    let issue = state.issues().resolve(id).map_err(issue_error_status)?;
    Ok(Json(IssueActionResponse { success: true, issue }))
}

fn issue_error_status(error: IssueError) -> (StatusCode, String) {
    let status = match error {
        IssueError::NotFound { .. } => StatusCode::NOT_FOUND,
        IssueError::AlreadyResolved { .. } => StatusCode::CONFLICT,
    };
    (status, error.to_string())
}
