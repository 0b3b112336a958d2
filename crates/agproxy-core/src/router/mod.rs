//! Account selection for inbound requests.

pub mod model_map;


use std::cmp::Ordering;
use std::sync::Arc;

use agproxy_types::RouterError;

use crate::health::HealthTracker;
use crate::registry::AccountRegistry;

/// The pair a request should be dispatched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelection {
    pub email: String,
    pub upstream_model: String,
}

/// Picks the healthiest, least-recently-used account for a model.
pub struct AccountRouter {
    registry: Arc<AccountRegistry>,
    tracker: Arc<HealthTracker>,
}

struct Candidate {
    email: String,
    consecutive_failures: u32,
    health_score: f64,
    last_success_ms: i64,
}

impl AccountRouter {
    pub fn new(registry: Arc<AccountRegistry>, tracker: Arc<HealthTracker>) -> Self {
        Self { registry, tracker }
    }

    /// Select an account for `model`.
    ///
    /// Candidates are enabled accounts the health tracker considers usable
    /// (which applies timeout auto-recovery as a side effect). Ordering:
    /// fewest consecutive failures, then highest score, then stalest last
    /// success to spread load, then email as the stable tie-break.
    pub fn pick_account(&self, model: &str) -> Result<RouteSelection, RouterError> {
        let mut candidates = Vec::new();

        for account in self.registry.list() {
            if !account.enabled {
                continue;
            }
            if !self.tracker.is_model_usable(&account.email, model) {
                continue;
            }

            // Re-read after the usability check; it may have just recovered
            // the record in place
            let record =
                self.tracker.record_snapshot(&account.email, model).unwrap_or_default();
            candidates.push(Candidate {
                email: account.email,
                consecutive_failures: record.consecutive_failures,
                health_score: record.health_score,
                last_success_ms: record
                    .last_success
                    .map_or(i64::MIN, |t| t.timestamp_millis()),
            });
        }

        if candidates.is_empty() {
            tracing::warn!("No usable account for model {model}");
            return Err(RouterError::NoUsableAccount { model: model.to_string() });
        }

        candidates.sort_by(|a, b| {
            a.consecutive_failures
                .cmp(&b.consecutive_failures)
                .then_with(|| {
                    b.health_score.partial_cmp(&a.health_score).unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.last_success_ms.cmp(&b.last_success_ms))
                .then_with(|| a.email.cmp(&b.email))
        });

        let head = &candidates[0];
        tracing::debug!(
            account = %head.email,
            score = head.health_score,
            "Routed model {model}"
        );

        Ok(RouteSelection {
            email: head.email.clone(),
            upstream_model: model_map::upstream_model(model),
        })
    }
}
