//! Event log and stream handlers

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};

use agproxy_types::{EventFilter, EventPage, EventStats};

use crate::state::AppState;

/// Backlog size cap mirrors the store's default page limit.
const DEFAULT_HISTORY_LIMIT: usize = 100;

pub async fn get_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Json<EventPage> {
    Json(state.events().get_events(&filter))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsQuery {
    pub since: Option<i64>,
    pub account: Option<String>,
    pub model: Option<String>,
}

pub async fn get_event_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<EventStats> {
    Json(state.events().get_stats(
        query.since.unwrap_or(0),
        query.account.as_deref(),
        query.model.as_deref(),
    ))
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub cleared: usize,
}

pub async fn clear_events(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse { success: true, cleared: state.events().clear() })
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct StreamQuery {
    /// Replay the newest events as one batch frame before going live
    pub history: Option<bool>,
    /// Backlog size when history is requested
    pub limit: Option<usize>,
}

/// Server-Sent Events: a `connected` frame, an optional history batch, then
/// one frame per recorded event, in record order.
pub async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let backlog = if query.history.unwrap_or(false) {
        let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Some(state.events().tail(limit))
    } else {
        None
    };

    let mut subscription = state.broker().subscribe(backlog);
    let stream = futures::stream::poll_fn(move |cx| {
        subscription
            .poll_frame(cx)
            .map(|frame| frame.map(|frame| Ok(SseEvent::default().data(frame.to_payload()))))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
