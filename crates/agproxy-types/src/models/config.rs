//! Health and retention configuration.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Tunables for health tracking, event retention, and issue aggregation.
///
/// Lives under the `health` key of the config file. Mutated only through
/// validated patches; see [`HealthConfigPatch`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthConfig {
    /// Failure streak that trips auto-disable
    pub consecutive_failure_threshold: u32,
    /// Score below which a pair counts as warning (0-100)
    pub warning_threshold: f64,
    /// Score below which a pair counts as critical (0-100, <= warning)
    pub critical_threshold: f64,
    /// Master switch for auto-disable
    pub auto_disable_enabled: bool,
    /// Cooldown before an auto-disabled pair becomes usable again
    pub auto_recovery_ms: u64,
    /// Hard cap on retained events (1000-50000)
    pub event_max_count: usize,
    /// Events older than this are pruned (1-30 days)
    pub event_retention_days: u32,
    /// Remaining-quota fraction below which collaborators protect a model (0.0-0.5)
    pub quota_threshold: f64,
    /// Interval of the issue-aggregation sweep
    pub quota_poll_interval_ms: u64,
    /// Sustain window for degraded-health issues and staleness cutoff for
    /// quiet rate-limit streaks
    pub stale_issue_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            consecutive_failure_threshold: 5,
            warning_threshold: 70.0,
            critical_threshold: 40.0,
            auto_disable_enabled: true,
            auto_recovery_ms: 10 * 60 * 1000,
            event_max_count: 10_000,
            event_retention_days: 7,
            quota_threshold: 0.1,
            quota_poll_interval_ms: 60_000,
            stale_issue_ms: 30 * 60 * 1000,
        }
    }
}

impl HealthConfig {
    /// Validate every field, collecting all failures instead of stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.consecutive_failure_threshold < 1 {
            errors.push(field_error(
                "consecutiveFailureThreshold",
                "must be at least 1",
            ));
        }
        if !(0.0..=100.0).contains(&self.warning_threshold) {
            errors.push(field_error("warningThreshold", "must be between 0 and 100"));
        }
        if !(0.0..=100.0).contains(&self.critical_threshold) {
            errors.push(field_error("criticalThreshold", "must be between 0 and 100"));
        }
        if self.warning_threshold < self.critical_threshold {
            errors.push(field_error(
                "warningThreshold",
                "must be greater than or equal to criticalThreshold",
            ));
        }
        if self.auto_recovery_ms == 0 {
            errors.push(field_error("autoRecoveryMs", "must be greater than 0"));
        }
        if !(1000..=50_000).contains(&self.event_max_count) {
            errors.push(field_error(
                "eventMaxCount",
                "must be between 1000 and 50000",
            ));
        }
        if !(1..=30).contains(&self.event_retention_days) {
            errors.push(field_error(
                "eventRetentionDays",
                "must be between 1 and 30",
            ));
        }
        if !(0.0..=0.5).contains(&self.quota_threshold) {
            errors.push(field_error("quotaThreshold", "must be between 0.0 and 0.5"));
        }
        if self.quota_poll_interval_ms == 0 {
            errors.push(field_error("quotaPollIntervalMs", "must be greater than 0"));
        }
        if self.stale_issue_ms == 0 {
            errors.push(field_error("staleIssueMs", "must be greater than 0"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Apply a partial patch in place. The result still needs [`validate`].
    ///
    /// [`validate`]: Self::validate
    pub fn apply(&mut self, patch: &HealthConfigPatch) {
        if let Some(v) = patch.consecutive_failure_threshold {
            self.consecutive_failure_threshold = v;
        }
        if let Some(v) = patch.warning_threshold {
            self.warning_threshold = v;
        }
        if let Some(v) = patch.critical_threshold {
            self.critical_threshold = v;
        }
        if let Some(v) = patch.auto_disable_enabled {
            self.auto_disable_enabled = v;
        }
        if let Some(v) = patch.auto_recovery_ms {
            self.auto_recovery_ms = v;
        }
        if let Some(v) = patch.event_max_count {
            self.event_max_count = v;
        }
        if let Some(v) = patch.event_retention_days {
            self.event_retention_days = v;
        }
        if let Some(v) = patch.quota_threshold {
            self.quota_threshold = v;
        }
        if let Some(v) = patch.quota_poll_interval_ms {
            self.quota_poll_interval_ms = v;
        }
        if let Some(v) = patch.stale_issue_ms {
            self.stale_issue_ms = v;
        }
    }
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError { field: field.to_string(), message: message.to_string() }
}

/// Partial update for [`HealthConfig`]; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthConfigPatch {
    pub consecutive_failure_threshold: Option<u32>,
    pub warning_threshold: Option<f64>,
    pub critical_threshold: Option<f64>,
    pub auto_disable_enabled: Option<bool>,
    pub auto_recovery_ms: Option<u64>,
    pub event_max_count: Option<usize>,
    pub event_retention_days: Option<u32>,
    pub quota_threshold: Option<f64>,
    pub quota_poll_interval_ms: Option<u64>,
    pub stale_issue_ms: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(HealthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_warning_below_critical_rejected() {
        let config = HealthConfig {
            warning_threshold: 30.0,
            critical_threshold: 50.0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "warningThreshold"));
    }

    #[test]
    fn test_all_failures_collected() {
        let config = HealthConfig {
            consecutive_failure_threshold: 0,
            auto_recovery_ms: 0,
            event_max_count: 10,
            event_retention_days: 90,
            quota_threshold: 0.9,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut config = HealthConfig::default();
        let patch = HealthConfigPatch {
            consecutive_failure_threshold: Some(3),
            ..Default::default()
        };
        config.apply(&patch);
        assert_eq!(config.consecutive_failure_threshold, 3);
        assert_eq!(config.event_retention_days, 7);
    }

    #[test]
    fn test_patch_wire_names() {
        let patch: HealthConfigPatch =
            serde_json::from_str(r#"{"autoRecoveryMs": 1000, "eventMaxCount": 2000}"#).unwrap();
        assert_eq!(patch.auto_recovery_ms, Some(1000));
        assert_eq!(patch.event_max_count, Some(2000));
    }
}
