//! Structured event log models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Request,
    RateLimit,
    AuthFailure,
    ApiError,
    Fallback,
    AccountSwitch,
    HealthChange,
    System,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::RateLimit => "rate_limit",
            Self::AuthFailure => "auth_failure",
            Self::ApiError => "api_error",
            Self::Fallback => "fallback",
            Self::AccountSwitch => "account_switch",
            Self::HealthChange => "health_change",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event severity, mapped onto log levels by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warn,
    Error,
}

impl EventSeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of a single system occurrence.
///
/// Ids are UUIDv7: unique and sortable in append order, which also breaks
/// ties between events sharing a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub severity: EventSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Human-readable summary, rendered by the recorder
    pub message: String,
    /// Structured payload, opaque to the store
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl ProxyEvent {
    /// Epoch milliseconds, for hot-path comparisons without reparsing.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Payload handed to the recorder; id, timestamp, and message are assigned
/// there.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub account: Option<String>,
    pub model: Option<String>,
    pub request_id: Option<String>,
    pub details: serde_json::Value,
}

/// Query filters for the event log. All fields are conjunctive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
    #[serde(rename = "type")]
    pub kind: Option<EventType>,
    pub account: Option<String>,
    pub model: Option<String>,
    pub severity: Option<EventSeverity>,
    pub request_id: Option<String>,
    /// Epoch milliseconds; events at or after this instant
    pub since: Option<i64>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One page of filtered events, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventPage {
    pub events: Vec<ProxyEvent>,
    /// Pre-pagination match count
    pub total: usize,
}

/// Request outcome counters inside [`EventStats`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    /// Percentage with one decimal; 100 when no requests were seen
    pub success_rate: f64,
}

/// Aggregated counts over a filtered event window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total: u64,
    pub by_type: HashMap<String, u64>,
    pub by_severity: HashMap<String, u64>,
    pub by_account: HashMap<String, u64>,
    pub by_model: HashMap<String, u64>,
    pub requests: RequestStats,
}
