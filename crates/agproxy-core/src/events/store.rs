//! The append-only event log.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use agproxy_types::{
    EventDraft, EventFilter, EventPage, EventSeverity, EventStats, EventType, ProxyEvent,
    RequestStats,
};

use super::{EventBroker, EventSink};
use crate::config_store::ConfigStore;
use crate::paths::{atomic_write, EVENTS_FILE};

/// Default page size for event queries.
const DEFAULT_PAGE_LIMIT: usize = 100;

/// Bounded, append-only structured event log.
///
/// Appends are serialized behind the buffer lock; sinks and the broadcast
/// run outside the append critical section. The store never propagates
/// errors to callers of `record`: a broken snapshot file cannot break the
/// request path.
pub struct EventStore {
    events_path: PathBuf,
    config: Arc<ConfigStore>,
    broker: Arc<EventBroker>,
    events: RwLock<Vec<ProxyEvent>>,
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
    dirty: AtomicBool,
}

impl EventStore {
    /// Load the store from `data_dir`. A corrupt snapshot is replaced by an
    /// empty log with an error log line.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        config: Arc<ConfigStore>,
        broker: Arc<EventBroker>,
    ) -> Self {
        let events_path = data_dir.into().join(EVENTS_FILE);
        let events = Self::load(&events_path);

        Self {
            events_path,
            config,
            broker,
            events: RwLock::new(events),
            sinks: RwLock::new(Vec::new()),
            dirty: AtomicBool::new(false),
        }
    }

    fn load(path: &std::path::Path) -> Vec<ProxyEvent> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read event snapshot {}: {e}", path.display());
                return Vec::new();
            },
        };

        match serde_json::from_str::<Vec<ProxyEvent>>(&content) {
            Ok(mut events) => {
                // Ids break ties between events sharing a timestamp
                events.sort_by(|a, b| {
                    a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id))
                });
                events
            },
            Err(e) => {
                tracing::error!(
                    "Corrupt event snapshot {}, starting with an empty log: {e}",
                    path.display()
                );
                Vec::new()
            },
        }
    }

    /// Register a synchronous consumer of every recorded event.
    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.sinks.write().push(sink);
    }

    /// Append a fully-rendered event: assign id and timestamp, log it at the
    /// severity-mapped level, feed the sinks, broadcast, and return it.
    pub fn record(
        &self,
        kind: EventType,
        severity: EventSeverity,
        message: String,
        draft: EventDraft,
    ) -> ProxyEvent {
        let event = ProxyEvent {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind,
            severity,
            account: draft.account,
            model: draft.model,
            request_id: draft.request_id,
            message,
            details: draft.details,
        };

        match severity {
            EventSeverity::Error => {
                tracing::error!(kind = %kind, account = ?event.account, "{}", event.message);
            },
            EventSeverity::Warn => {
                tracing::warn!(kind = %kind, account = ?event.account, "{}", event.message);
            },
            EventSeverity::Info => {
                tracing::info!(kind = %kind, account = ?event.account, "{}", event.message);
            },
        }

        self.events.write().push(event.clone());
        self.dirty.store(true, Ordering::Release);

        let sinks: Vec<Arc<dyn EventSink>> = self.sinks.read().clone();
        for sink in sinks {
            sink.on_event(&event);
        }

        self.broker.broadcast(&event);
        event
    }

    /// Filtered page, newest first. `total` is the pre-pagination count.
    pub fn get_events(&self, filter: &EventFilter) -> EventPage {
        let events = self.events.read();
        let matched: Vec<&ProxyEvent> =
            events.iter().rev().filter(|e| Self::matches(filter, e)).collect();

        let total = matched.len();
        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        let page = matched.into_iter().skip(offset).take(limit).cloned().collect();

        EventPage { events: page, total }
    }

    fn matches(filter: &EventFilter, event: &ProxyEvent) -> bool {
        if let Some(kind) = filter.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(severity) = filter.severity {
            if event.severity != severity {
                return false;
            }
        }
        if let Some(account) = &filter.account {
            if event.account.as_deref() != Some(account.as_str()) {
                return false;
            }
        }
        if let Some(model) = &filter.model {
            if event.model.as_deref() != Some(model.as_str()) {
                return false;
            }
        }
        if let Some(request_id) = &filter.request_id {
            if event.request_id.as_deref() != Some(request_id.as_str()) {
                return false;
            }
        }
        if let Some(since) = filter.since {
            if event.timestamp_ms() < since {
                return false;
            }
        }
        true
    }

    /// Aggregate counts over the window at or after `since` (epoch ms).
    pub fn get_stats(
        &self,
        since: i64,
        account: Option<&str>,
        model: Option<&str>,
    ) -> EventStats {
        let events = self.events.read();

        let mut by_type: HashMap<String, u64> = HashMap::new();
        let mut by_severity: HashMap<String, u64> = HashMap::new();
        let mut by_account: HashMap<String, u64> = HashMap::new();
        let mut by_model: HashMap<String, u64> = HashMap::new();
        let mut total: u64 = 0;
        let mut requests = RequestStats::default();

        for event in events.iter() {
            if event.timestamp_ms() < since {
                continue;
            }
            if let Some(account) = account {
                if event.account.as_deref() != Some(account) {
                    continue;
                }
            }
            if let Some(model) = model {
                if event.model.as_deref() != Some(model) {
                    continue;
                }
            }

            total += 1;
            *by_type.entry(event.kind.as_str().to_string()).or_default() += 1;
            *by_severity.entry(event.severity.as_str().to_string()).or_default() += 1;
            if let Some(account) = &event.account {
                *by_account.entry(account.clone()).or_default() += 1;
            }
            if let Some(model) = &event.model {
                *by_model.entry(model.clone()).or_default() += 1;
            }

            if event.kind == EventType::Request {
                requests.total += 1;
                if event.details.get("success").and_then(serde_json::Value::as_bool)
                    == Some(true)
                {
                    requests.success += 1;
                } else {
                    requests.failed += 1;
                }
            }
        }

        requests.success_rate = if requests.total == 0 {
            100.0
        } else {
            (requests.success as f64 * 1000.0 / requests.total as f64).round() / 10.0
        };

        EventStats { total, by_type, by_severity, by_account, by_model, requests }
    }

    /// Newest `limit` events in chronological order, for stream backlog.
    pub fn tail(&self, limit: usize) -> Vec<ProxyEvent> {
        let events = self.events.read();
        let start = events.len().saturating_sub(limit);
        events[start..].to_vec()
    }

    /// Drop all events, persist immediately, and return the prior count.
    pub fn clear(&self) -> usize {
        let cleared = {
            let mut events = self.events.write();
            let cleared = events.len();
            events.clear();
            cleared
        };

        self.dirty.store(true, Ordering::Release);
        self.save_if_dirty();
        tracing::info!("Event log cleared ({cleared} events dropped)");
        cleared
    }

    pub fn count(&self) -> usize {
        self.events.read().len()
    }

    /// Snapshot the full array to disk when dirty.
    ///
    /// A failed write logs an error and leaves the dirty flag set for the
    /// next tick; in-memory state stays authoritative.
    pub fn save_if_dirty(&self) -> bool {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }

        let snapshot = self.events.read().clone();
        let content = match serde_json::to_string(&snapshot) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to serialize event snapshot: {e}");
                self.dirty.store(true, Ordering::Release);
                return false;
            },
        };

        if let Err(e) = atomic_write(&self.events_path, &content) {
            tracing::error!("Failed to write event snapshot: {e}");
            self.dirty.store(true, Ordering::Release);
            return false;
        }

        true
    }

    /// Apply the retention policy: drop events past the age cutoff, then
    /// truncate to the newest `event_max_count`.
    pub fn prune(&self) -> usize {
        let config = self.config.get();
        let cutoff_ms = Utc::now().timestamp_millis()
            - i64::from(config.event_retention_days) * 24 * 60 * 60 * 1000;
        let max_count = config.event_max_count;

        let removed = {
            let mut events = self.events.write();
            let before = events.len();
            events.retain(|e| e.timestamp_ms() >= cutoff_ms);
            if events.len() > max_count {
                let excess = events.len() - max_count;
                events.drain(..excess);
            }
            before - events.len()
        };

        if removed > 0 {
            self.dirty.store(true, Ordering::Release);
            tracing::debug!("Pruned {removed} events past retention");
        }

        removed
    }
}
