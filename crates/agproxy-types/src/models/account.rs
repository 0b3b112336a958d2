//! Account model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::health::HealthRecord;

/// An upstream account in the rotation pool.
///
/// Created at startup from stored credentials and mutated only through
/// the account registry. `email` is the stable identifier and never
/// changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Email address; unique across the pool
    pub email: String,
    /// When false the router must never select this account
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Upstream project identifier, opaque to the routing core
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Where the credentials came from (oauth flow, import, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Upstream quota/limit metadata, opaque to the routing core
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub limits: serde_json::Value,
    /// Per-model health records, created lazily on first result
    #[serde(default)]
    pub health: HashMap<String, HealthRecord>,
    /// Timestamp when the account was added
    pub created_at: DateTime<Utc>,
}

const fn default_enabled() -> bool {
    true
}

impl Account {
    /// Create a new enabled account with no health history.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            enabled: true,
            project_id: None,
            source: None,
            limits: serde_json::Value::Null,
            health: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Health record for a model, if one was ever created.
    pub fn health_record(&self, model: &str) -> Option<&HealthRecord> {
        self.health.get(model)
    }

    /// Health record for a model, created on first use.
    pub fn health_record_mut(&mut self, model: &str) -> &mut HealthRecord {
        self.health.entry(model.to_string()).or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new("a@example.com");
        assert!(account.enabled);
        assert!(account.health.is_empty());
        assert_eq!(account.limits, serde_json::Value::Null);
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"email":"a@example.com","createdAt":"2026-01-01T00:00:00Z"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert!(account.enabled);
        assert!(account.health.is_empty());
    }

    #[test]
    fn test_health_round_trip() {
        let mut account = Account::new("a@example.com");
        account.health_record_mut("gemini-3-pro").fail_count = 2;

        let json = serde_json::to_string(&account).unwrap();
        let parsed: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(account, parsed);
    }
}
