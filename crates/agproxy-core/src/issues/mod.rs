//! Rolls raw events into operator-visible incidents.
//!
//! The tracker consumes every recorded event through the [`EventSink`]
//! capability and runs a periodic [`sweep`] against the current health
//! matrix to open sustained-degradation incidents and close anything whose
//! trigger is known to have cleared.
//!
//! [`sweep`]: IssueTracker::sweep


use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use agproxy_types::{
    EventType, HealthMatrix, Issue, IssueError, IssueSeverity, IssueStats, IssueStatus,
    IssueType, ProxyEvent,
};

use crate::config_store::ConfigStore;
use crate::events::EventSink;

/// Window for counting rate-limit hits against one (account, model) pair.
const RATE_LIMIT_WINDOW_MS: i64 = 10 * 60 * 1000;
/// Hits within the window that open a streak incident.
const RATE_LIMIT_STREAK: usize = 3;

pub struct IssueTracker {
    config: Arc<ConfigStore>,
    issues: RwLock<Vec<Issue>>,
    rate_limit_hits: Mutex<HashMap<(String, String), VecDeque<i64>>>,
    degraded_since: Mutex<HashMap<(String, String), i64>>,
}

impl IssueTracker {
    pub fn new(config: Arc<ConfigStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            issues: RwLock::new(Vec::new()),
            rate_limit_hits: Mutex::new(HashMap::new()),
            degraded_since: Mutex::new(HashMap::new()),
        })
    }

    /// Feed one event into the detection rules.
    pub fn ingest(&self, event: &ProxyEvent) {
        match event.kind {
            EventType::RateLimit => self.on_rate_limit(event),
            EventType::AuthFailure => self.on_auth_failure(event),
            EventType::HealthChange => self.on_health_change(event),
            EventType::Request => self.on_request(event),
            _ => {},
        }
    }

    fn on_rate_limit(&self, event: &ProxyEvent) {
        let (Some(account), Some(model)) = (&event.account, &event.model) else {
            return;
        };

        let now_ms = event.timestamp_ms();
        let streak = {
            let mut hits = self.rate_limit_hits.lock();
            let window = hits.entry((account.clone(), model.clone())).or_default();
            window.push_back(now_ms);
            while window.front().is_some_and(|t| now_ms - t > RATE_LIMIT_WINDOW_MS) {
                window.pop_front();
            }
            window.len()
        };

        if streak >= RATE_LIMIT_STREAK {
            self.upsert(
                IssueType::RateLimitStreak,
                IssueSeverity::Medium,
                Some(account.clone()),
                Some(model.clone()),
                serde_json::json!({ "hitsInWindow": streak }),
            );
        }
    }

    fn on_auth_failure(&self, event: &ProxyEvent) {
        let Some(account) = &event.account else { return };
        self.upsert(
            IssueType::AuthFailure,
            IssueSeverity::High,
            Some(account.clone()),
            None,
            event.details.clone(),
        );
    }

    fn on_health_change(&self, event: &ProxyEvent) {
        let (Some(account), Some(model)) = (&event.account, &event.model) else {
            return;
        };

        match event.details.get("status").and_then(serde_json::Value::as_str) {
            Some("disabled") => {
                self.upsert(
                    IssueType::ModelExhausted,
                    IssueSeverity::High,
                    Some(account.clone()),
                    Some(model.clone()),
                    event.details.clone(),
                );
            },
            Some("recovered") => {
                self.resolve_key(IssueType::ModelExhausted, Some(account), Some(model));
            },
            _ => {},
        }
    }

    fn on_request(&self, event: &ProxyEvent) {
        let Some(account) = &event.account else { return };
        if event.details.get("success").and_then(serde_json::Value::as_bool) == Some(true) {
            // A working request proves the credentials are good again
            self.resolve_key(IssueType::AuthFailure, Some(account), None);
        }
    }

    /// Periodic aggregation pass.
    ///
    /// Opens sustained-degradation incidents from the matrix, self-resolves
    /// issues whose trigger cleared, and expires streak incidents whose
    /// window went quiet.
    pub fn sweep(&self, matrix: &HealthMatrix) {
        let config = self.config.get();
        let now_ms = Utc::now().timestamp_millis();
        let sustain_ms = config.stale_issue_ms as i64;

        for row in &matrix.accounts {
            for (model, record) in &row.models {
                let key = (row.email.clone(), model.clone());
                let below_critical = !record.disabled
                    && !record.manual_disabled
                    && record.health_score < config.critical_threshold;

                if below_critical {
                    let since =
                        *self.degraded_since.lock().entry(key).or_insert(now_ms);
                    if now_ms - since >= sustain_ms {
                        self.upsert(
                            IssueType::HealthDegraded,
                            IssueSeverity::Medium,
                            Some(row.email.clone()),
                            Some(model.clone()),
                            serde_json::json!({ "healthScore": record.health_score }),
                        );
                    }
                } else {
                    self.degraded_since.lock().remove(&key);
                    self.resolve_key(IssueType::HealthDegraded, Some(&row.email), Some(model));
                    if !record.disabled && !record.manual_disabled {
                        // Covers recovery transitions this process never saw
                        self.resolve_key(
                            IssueType::ModelExhausted,
                            Some(&row.email),
                            Some(model),
                        );
                    }
                }
            }
        }

        // A streak that went quiet is no longer an incident
        let stale: Vec<Uuid> = self
            .issues
            .read()
            .iter()
            .filter(|issue| {
                issue.kind == IssueType::RateLimitStreak
                    && issue.status != IssueStatus::Resolved
                    && now_ms - issue.last_seen.timestamp_millis() > sustain_ms
            })
            .map(|issue| issue.id)
            .collect();
        for id in stale {
            let _ = self.resolve(id);
        }

        self.rate_limit_hits.lock().retain(|_, window| {
            window.back().is_some_and(|t| now_ms - t <= RATE_LIMIT_WINDOW_MS)
        });
    }

    fn upsert(
        &self,
        kind: IssueType,
        severity: IssueSeverity,
        account: Option<String>,
        model: Option<String>,
        details: serde_json::Value,
    ) {
        let now = Utc::now();
        let mut issues = self.issues.write();

        if let Some(issue) = issues.iter_mut().find(|issue| {
            issue.kind == kind
                && issue.account == account
                && issue.model == model
                && issue.status != IssueStatus::Resolved
        }) {
            issue.count += 1;
            issue.last_seen = now;
            issue.details = details;
            return;
        }

        tracing::warn!(
            kind = %kind,
            account = ?account,
            model = ?model,
            "Issue opened"
        );
        issues.push(Issue {
            id: Uuid::now_v7(),
            kind,
            severity,
            account,
            model,
            first_seen: now,
            last_seen: now,
            count: 1,
            status: IssueStatus::Active,
            details,
        });
    }

    fn resolve_key(&self, kind: IssueType, account: Option<&String>, model: Option<&String>) {
        let mut issues = self.issues.write();
        if let Some(issue) = issues.iter_mut().find(|issue| {
            issue.kind == kind
                && issue.account.as_ref() == account
                && issue.model.as_ref() == model
                && issue.status != IssueStatus::Resolved
        }) {
            issue.status = IssueStatus::Resolved;
            issue.last_seen = Utc::now();
            tracing::info!(kind = %kind, account = ?account, "Issue self-resolved");
        }
    }

    /// Issues filtered by status, newest activity first.
    pub fn list(&self, status: Option<IssueStatus>) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .issues
            .read()
            .iter()
            .filter(|issue| status.is_none_or(|s| issue.status == s))
            .cloned()
            .collect();
        issues.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        issues
    }

    /// Unresolved issues (active and acknowledged), for the dashboard banner.
    pub fn open(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .issues
            .read()
            .iter()
            .filter(|issue| issue.status != IssueStatus::Resolved)
            .cloned()
            .collect();
        issues.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        issues
    }

    pub fn stats(&self) -> IssueStats {
        let issues = self.issues.read();
        let mut stats = IssueStats { total: issues.len(), ..Default::default() };

        for issue in issues.iter() {
            match issue.status {
                IssueStatus::Active => stats.active += 1,
                IssueStatus::Acknowledged => stats.acknowledged += 1,
                IssueStatus::Resolved => stats.resolved += 1,
            }
            if issue.status != IssueStatus::Resolved {
                *stats.by_severity.entry(issue.severity.as_str().to_string()).or_default() +=
                    1;
            }
        }

        stats
    }

    /// Operator acknowledgement; resolution stays terminal.
    pub fn acknowledge(&self, id: Uuid) -> Result<Issue, IssueError> {
        let mut issues = self.issues.write();
        let issue = issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| IssueError::NotFound { id: id.to_string() })?;

        if issue.status == IssueStatus::Resolved {
            return Err(IssueError::AlreadyResolved { id: id.to_string() });
        }

        issue.status = IssueStatus::Acknowledged;
        Ok(issue.clone())
    }

    /// Operator resolution; terminal.
    pub fn resolve(&self, id: Uuid) -> Result<Issue, IssueError> {
        let mut issues = self.issues.write();
        let issue = issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| IssueError::NotFound { id: id.to_string() })?;

        if issue.status == IssueStatus::Resolved {
            return Err(IssueError::AlreadyResolved { id: id.to_string() });
        }

        issue.status = IssueStatus::Resolved;
        issue.last_seen = Utc::now();
        Ok(issue.clone())
    }
}

impl EventSink for IssueTracker {
    fn on_event(&self, event: &ProxyEvent) {
        self.ingest(event);
    }
}
