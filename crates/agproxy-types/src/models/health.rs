//! Per-(account, model) health records and derived views.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cap on the consecutive-failure score penalty.
const MAX_STREAK_PENALTY: f64 = 30.0;
/// Penalty per consecutive failure.
const STREAK_PENALTY_STEP: f64 = 6.0;

/// Last error observed for an (account, model) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LastError {
    /// Human-readable error message
    pub message: String,
    /// Upstream status/error code when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// When the error was recorded
    pub at: DateTime<Utc>,
}

/// Health state of one (account, model) pair.
///
/// `health_score` is a pure function of the counters; `manual_disabled` is
/// an operator override independent of failure history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthRecord {
    pub success_count: u64,
    pub fail_count: u64,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LastError>,
    pub health_score: f64,
    /// Auto-disable flag, set by the health tracker
    pub disabled: bool,
    /// Operator override; survives auto-recovery
    pub manual_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<DateTime<Utc>>,
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self {
            success_count: 0,
            fail_count: 0,
            consecutive_failures: 0,
            last_success: None,
            last_error: None,
            health_score: 100.0,
            disabled: false,
            manual_disabled: false,
            disabled_reason: None,
            disabled_at: None,
        }
    }
}

impl HealthRecord {
    /// Recompute `health_score` from the counters.
    ///
    /// `100 * success / total`, minus 6 points per consecutive failure
    /// capped at 30, clamped to 0..=100. An untouched record scores 100.
    pub fn recalculate_score(&mut self) {
        let total = self.success_count + self.fail_count;
        self.health_score = if total == 0 {
            100.0
        } else {
            let base = 100.0 * self.success_count as f64 / total as f64;
            let penalty = (f64::from(self.consecutive_failures) * STREAK_PENALTY_STEP)
                .min(MAX_STREAK_PENALTY);
            (base - penalty).clamp(0.0, 100.0)
        };
    }

    /// Whether the pair may serve requests right now.
    ///
    /// Does not apply timeout auto-recovery; the health tracker owns that.
    pub const fn is_usable(&self) -> bool {
        !self.disabled && !self.manual_disabled
    }

    /// Classify against the configured thresholds.
    pub fn status(&self, warning_threshold: f64, critical_threshold: f64) -> HealthStatus {
        if self.disabled || self.manual_disabled {
            HealthStatus::Disabled
        } else if self.health_score < critical_threshold {
            HealthStatus::Critical
        } else if self.health_score < warning_threshold {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Threshold classification of a health record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Disabled,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Direction of a `health_change` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthChange {
    Disabled,
    Recovered,
}

impl HealthChange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Recovered => "recovered",
        }
    }
}

/// One account's row in the health matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountHealthRow {
    pub email: String,
    pub enabled: bool,
    /// Snapshot per requested model; synthetic fresh records for pairs
    /// that never served a request
    pub models: HashMap<String, HealthRecord>,
}

/// Dashboard view of every account against a set of models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthMatrix {
    pub accounts: Vec<AccountHealthRow>,
    pub models: Vec<String>,
    pub generated: DateTime<Utc>,
}

/// Aggregate counts across all tracked (account, model) pairs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub disabled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_scores_100() {
        let record = HealthRecord::default();
        assert_eq!(record.health_score, 100.0);
        assert!(record.is_usable());
    }

    #[test]
    fn test_score_formula() {
        // 9 successes, 1 failure, streak of 1: clamp(90 - 6) = 84
        let mut record = HealthRecord {
            success_count: 9,
            fail_count: 1,
            consecutive_failures: 1,
            ..Default::default()
        };
        record.recalculate_score();
        assert_eq!(record.health_score, 84.0);
    }

    #[test]
    fn test_score_penalty_capped() {
        let mut record = HealthRecord {
            success_count: 100,
            fail_count: 0,
            consecutive_failures: 50,
            ..Default::default()
        };
        record.recalculate_score();
        assert_eq!(record.health_score, 70.0);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let mut record = HealthRecord {
            success_count: 0,
            fail_count: 5,
            consecutive_failures: 5,
            ..Default::default()
        };
        record.recalculate_score();
        assert_eq!(record.health_score, 0.0);
    }

    #[test]
    fn test_status_thresholds() {
        let mut record = HealthRecord { health_score: 50.0, ..Default::default() };
        assert_eq!(record.status(70.0, 40.0), HealthStatus::Warning);

        record.health_score = 30.0;
        assert_eq!(record.status(70.0, 40.0), HealthStatus::Critical);

        record.manual_disabled = true;
        assert_eq!(record.status(70.0, 40.0), HealthStatus::Disabled);
    }
}
