//! Health tracker implementation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use agproxy_types::{
    AccountHealthRow, HealthChange, HealthMatrix, HealthRecord, HealthSummary, LastError,
};

use crate::config_store::ConfigStore;
use crate::events::EventStore;
use crate::registry::AccountRegistry;

/// Failure details reported alongside an unsuccessful result.
#[derive(Debug, Clone)]
pub struct RequestError {
    pub message: String,
    pub code: Option<String>,
}

impl RequestError {
    pub fn new(message: impl Into<String>, code: Option<String>) -> Self {
        Self { message: message.into(), code }
    }
}

/// What a mutation decided to announce, emitted after the entry lock drops
/// so the new state is observable before the event reaches any subscriber.
enum PendingChange {
    Disabled { reason: String, score: f64 },
    Recovered { trigger: &'static str, score: f64 },
}

/// Records request outcomes and answers usability queries for the router.
///
/// Never fails: an absent account is a no-op read and a `None` write.
pub struct HealthTracker {
    registry: Arc<AccountRegistry>,
    config: Arc<ConfigStore>,
    events: Arc<EventStore>,
}

impl HealthTracker {
    pub fn new(
        registry: Arc<AccountRegistry>,
        config: Arc<ConfigStore>,
        events: Arc<EventStore>,
    ) -> Self {
        Self { registry, config, events }
    }

    /// Record one request outcome for an (account, model) pair.
    ///
    /// Success resets the failure streak and clears an auto-disable (manual
    /// disables survive). Failure grows the streak and trips auto-disable at
    /// the configured threshold. The score is recomputed either way.
    pub fn record_result(
        &self,
        email: &str,
        model: &str,
        success: bool,
        error: Option<&RequestError>,
    ) -> Option<HealthRecord> {
        let config = self.config.get();
        let mut pending: Option<PendingChange> = None;

        let record = self.registry.with_account_mut(email, |account| {
            let record = account.health_record_mut(model);
            let now = Utc::now();

            if success {
                record.success_count += 1;
                record.consecutive_failures = 0;
                record.last_success = Some(now);
                record.recalculate_score();

                if record.disabled && !record.manual_disabled {
                    record.disabled = false;
                    record.disabled_reason = None;
                    record.disabled_at = None;
                    pending = Some(PendingChange::Recovered {
                        trigger: "successful_request",
                        score: record.health_score,
                    });
                }
            } else {
                record.fail_count += 1;
                record.consecutive_failures += 1;
                record.last_error = Some(LastError {
                    message: error.map_or_else(
                        || "request failed".to_string(),
                        |e| e.message.clone(),
                    ),
                    code: error.and_then(|e| e.code.clone()),
                    at: now,
                });
                record.recalculate_score();

                let tripped = config.auto_disable_enabled
                    && !record.disabled
                    && !record.manual_disabled
                    && record.consecutive_failures >= config.consecutive_failure_threshold;
                if tripped {
                    let reason =
                        format!("{} consecutive failures", record.consecutive_failures);
                    record.disabled = true;
                    record.disabled_reason = Some(reason.clone());
                    record.disabled_at = Some(now);
                    pending =
                        Some(PendingChange::Disabled { reason, score: record.health_score });
                }
            }

            record.clone()
        })?;

        self.emit(email, model, pending);
        Some(record)
    }

    /// Whether the router may send `model` traffic to `email` right now.
    ///
    /// This is the canonical read: an auto-disabled pair whose cooldown has
    /// elapsed is recovered here, in place, before the answer is returned.
    pub fn is_model_usable(&self, email: &str, model: &str) -> bool {
        let config = self.config.get();
        let mut pending: Option<PendingChange> = None;

        let usable = self.registry.with_account_mut(email, |account| {
            let Some(record) = account.health.get_mut(model) else {
                // Never used means nothing known against it
                return true;
            };

            if record.disabled && !record.manual_disabled {
                let elapsed_ms = record
                    .disabled_at
                    .map(|at| Utc::now().signed_duration_since(at).num_milliseconds());
                if elapsed_ms.is_some_and(|ms| ms > config.auto_recovery_ms as i64) {
                    record.disabled = false;
                    record.disabled_reason = None;
                    record.disabled_at = None;
                    record.consecutive_failures = 0;
                    record.recalculate_score();
                    pending = Some(PendingChange::Recovered {
                        trigger: "auto_recovery_timeout",
                        score: record.health_score,
                    });
                    return true;
                }
            }

            record.is_usable()
        });

        self.emit(email, model, pending);
        usable.unwrap_or(false)
    }

    /// Operator override. Enabling also clears an auto-disable.
    pub fn toggle_model(&self, email: &str, model: &str, enabled: bool) -> Option<HealthRecord> {
        self.registry.with_account_mut(email, |account| {
            let record = account.health_record_mut(model);

            if enabled {
                record.manual_disabled = false;
                record.disabled = false;
                record.disabled_reason = None;
                record.disabled_at = None;
            } else {
                let newly_disabled = !record.disabled && !record.manual_disabled;
                record.manual_disabled = true;
                if newly_disabled {
                    record.disabled_reason = Some("manually disabled by operator".to_string());
                    record.disabled_at = Some(Utc::now());
                }
            }

            record.clone()
        })
    }

    /// Replace the record(s) with fresh zero records; idempotent.
    pub fn reset_health(&self, email: &str, model: Option<&str>) -> bool {
        self.registry
            .with_account_mut(email, |account| match model {
                Some(model) => {
                    account.health.insert(model.to_string(), HealthRecord::default());
                },
                None => {
                    for record in account.health.values_mut() {
                        *record = HealthRecord::default();
                    }
                },
            })
            .is_some()
    }

    /// Snapshot of every account against the requested models.
    ///
    /// Pairs that never served a request get a synthetic fresh record.
    pub fn build_health_matrix(&self, models: &[String]) -> HealthMatrix {
        let accounts = self
            .registry
            .list()
            .into_iter()
            .map(|account| {
                let records = models
                    .iter()
                    .map(|model| {
                        let record =
                            account.health_record(model).cloned().unwrap_or_default();
                        (model.clone(), record)
                    })
                    .collect();
                AccountHealthRow {
                    email: account.email,
                    enabled: account.enabled,
                    models: records,
                }
            })
            .collect();

        HealthMatrix { accounts, models: models.to_vec(), generated: Utc::now() }
    }

    /// Counts across all tracked pairs, classified by the configured
    /// thresholds.
    pub fn health_summary(&self) -> HealthSummary {
        let config = self.config.get();
        let mut summary = HealthSummary::default();

        for account in self.registry.list() {
            for record in account.health.values() {
                match record.status(config.warning_threshold, config.critical_threshold) {
                    agproxy_types::HealthStatus::Healthy => summary.healthy += 1,
                    agproxy_types::HealthStatus::Warning => summary.warning += 1,
                    agproxy_types::HealthStatus::Critical => summary.critical += 1,
                    agproxy_types::HealthStatus::Disabled => summary.disabled += 1,
                }
            }
        }

        summary
    }

    /// Health records of one account, if it exists.
    pub fn account_health(&self, email: &str) -> Option<HashMap<String, HealthRecord>> {
        self.registry.get(email).map(|account| account.health)
    }

    /// Current record snapshot for a pair, if one was ever created.
    pub fn record_snapshot(&self, email: &str, model: &str) -> Option<HealthRecord> {
        self.registry.get(email).and_then(|account| account.health_record(model).cloned())
    }

    fn emit(&self, email: &str, model: &str, pending: Option<PendingChange>) {
        match pending {
            Some(PendingChange::Disabled { reason, score }) => {
                self.events.record_health_change(
                    email,
                    model,
                    HealthChange::Disabled,
                    "consecutive_failures",
                    Some(&reason),
                    score,
                );
            },
            Some(PendingChange::Recovered { trigger, score }) => {
                self.events.record_health_change(
                    email,
                    model,
                    HealthChange::Recovered,
                    trigger,
                    None,
                    score,
                );
            },
            None => {},
        }
    }
}
