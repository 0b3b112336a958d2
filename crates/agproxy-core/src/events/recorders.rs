//! Convenience recorders with fixed type/severity mappings.
//!
//! Messages are rendered here, deterministically, so the dashboard can grep
//! them; callers only supply the correlation keys and structured details.

use agproxy_types::{EventDraft, EventSeverity, EventType, HealthChange, ProxyEvent};

use super::store::EventStore;

impl EventStore {
    /// `rate_limit` / warn.
    pub fn record_rate_limit(
        &self,
        account: &str,
        model: &str,
        retry_after_secs: Option<u64>,
        request_id: Option<&str>,
    ) -> ProxyEvent {
        self.record(
            EventType::RateLimit,
            EventSeverity::Warn,
            format!("Rate limit hit for {account} on {model}"),
            EventDraft {
                account: Some(account.to_string()),
                model: Some(model.to_string()),
                request_id: request_id.map(str::to_string),
                details: serde_json::json!({ "retryAfterSecs": retry_after_secs }),
            },
        )
    }

    /// `auth_failure` / error.
    pub fn record_auth_failure(
        &self,
        account: &str,
        reason: &str,
        request_id: Option<&str>,
    ) -> ProxyEvent {
        self.record(
            EventType::AuthFailure,
            EventSeverity::Error,
            format!("Authentication failure for {account}: {reason}"),
            EventDraft {
                account: Some(account.to_string()),
                model: None,
                request_id: request_id.map(str::to_string),
                details: serde_json::json!({ "reason": reason }),
            },
        )
    }

    /// `api_error` / error.
    pub fn record_api_error(
        &self,
        account: &str,
        model: &str,
        code: Option<&str>,
        message: &str,
        request_id: Option<&str>,
    ) -> ProxyEvent {
        self.record(
            EventType::ApiError,
            EventSeverity::Error,
            format!("API error for {account} on {model}: {message}"),
            EventDraft {
                account: Some(account.to_string()),
                model: Some(model.to_string()),
                request_id: request_id.map(str::to_string),
                details: serde_json::json!({ "code": code, "message": message }),
            },
        )
    }

    /// `fallback` / warn. Emitted when a request is demoted to a weaker model.
    pub fn record_fallback(
        &self,
        account: &str,
        from_model: &str,
        to_model: &str,
        request_id: Option<&str>,
    ) -> ProxyEvent {
        self.record(
            EventType::Fallback,
            EventSeverity::Warn,
            format!("Fell back from {from_model} to {to_model} for {account}"),
            EventDraft {
                account: Some(account.to_string()),
                model: Some(from_model.to_string()),
                request_id: request_id.map(str::to_string),
                details: serde_json::json!({ "fromModel": from_model, "toModel": to_model }),
            },
        )
    }

    /// `account_switch` / info. Emitted on mid-request account rotation.
    pub fn record_account_switch(
        &self,
        from_account: Option<&str>,
        to_account: &str,
        model: &str,
        reason: &str,
        request_id: Option<&str>,
    ) -> ProxyEvent {
        let message = match from_account {
            Some(from) => format!("Switched account {from} to {to_account} for {model}: {reason}"),
            None => format!("Selected account {to_account} for {model}: {reason}"),
        };
        self.record(
            EventType::AccountSwitch,
            EventSeverity::Info,
            message,
            EventDraft {
                account: Some(to_account.to_string()),
                model: Some(model.to_string()),
                request_id: request_id.map(str::to_string),
                details: serde_json::json!({ "fromAccount": from_account, "reason": reason }),
            },
        )
    }

    /// `health_change` / error on disable, info on recovery.
    pub fn record_health_change(
        &self,
        account: &str,
        model: &str,
        change: HealthChange,
        trigger: &str,
        reason: Option<&str>,
        health_score: f64,
    ) -> ProxyEvent {
        let (severity, message) = match change {
            HealthChange::Disabled => (
                EventSeverity::Error,
                format!(
                    "Model {model} disabled for {account}: {}",
                    reason.unwrap_or("health check failed")
                ),
            ),
            HealthChange::Recovered => {
                (EventSeverity::Info, format!("Model {model} recovered for {account}"))
            },
        };

        self.record(
            EventType::HealthChange,
            severity,
            message,
            EventDraft {
                account: Some(account.to_string()),
                model: Some(model.to_string()),
                request_id: None,
                details: serde_json::json!({
                    "status": change.as_str(),
                    "trigger": trigger,
                    "reason": reason,
                    "healthScore": health_score,
                }),
            },
        )
    }

    /// `request` / info on success, warn on failure.
    pub fn record_request(
        &self,
        account: &str,
        model: &str,
        success: bool,
        request_id: Option<&str>,
        duration_ms: Option<u64>,
    ) -> ProxyEvent {
        let (severity, message) = if success {
            (EventSeverity::Info, format!("Request served by {account} on {model}"))
        } else {
            (EventSeverity::Warn, format!("Request failed for {account} on {model}"))
        };

        self.record(
            EventType::Request,
            severity,
            message,
            EventDraft {
                account: Some(account.to_string()),
                model: Some(model.to_string()),
                request_id: request_id.map(str::to_string),
                details: serde_json::json!({ "success": success, "durationMs": duration_ms }),
            },
        )
    }

    /// `system` / info.
    pub fn record_system(&self, message: String, details: serde_json::Value) -> ProxyEvent {
        self.record(
            EventType::System,
            EventSeverity::Info,
            message,
            EventDraft { account: None, model: None, request_id: None, details },
        )
    }
}
