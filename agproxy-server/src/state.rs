//! Application State
//!
//! Holds the long-lived core services behind one cheap-to-clone handle.

use std::path::PathBuf;
use std::sync::Arc;

use agproxy_core::{
    AccountRegistry, AccountRouter, ConfigStore, EventBroker, EventStore, HealthTracker,
    IssueTracker,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: Arc<ConfigStore>,
    pub broker: Arc<EventBroker>,
    pub events: Arc<EventStore>,
    pub issues: Arc<IssueTracker>,
    pub registry: Arc<AccountRegistry>,
    pub tracker: Arc<HealthTracker>,
    pub router: AccountRouter,
}

impl AppState {
    /// Wire the core services over `data_dir`.
    ///
    /// Construction order matters only for injection: the issue tracker
    /// registers as an event sink before the registry starts emitting.
    pub fn new(data_dir: PathBuf) -> Self {
        let config = Arc::new(ConfigStore::new(&data_dir));
        let broker = EventBroker::new();
        let events = Arc::new(EventStore::new(&data_dir, config.clone(), broker.clone()));

        let issues = IssueTracker::new(config.clone());
        events.add_sink(issues.clone());

        let registry = Arc::new(AccountRegistry::new(&data_dir, events.clone()));
        let tracker =
            Arc::new(HealthTracker::new(registry.clone(), config.clone(), events.clone()));
        let router = AccountRouter::new(registry.clone(), tracker.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                broker,
                events,
                issues,
                registry,
                tracker,
                router,
            }),
        }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.inner.config
    }

    pub fn broker(&self) -> &Arc<EventBroker> {
        &self.inner.broker
    }

    pub fn events(&self) -> &Arc<EventStore> {
        &self.inner.events
    }

    pub fn issues(&self) -> &Arc<IssueTracker> {
        &self.inner.issues
    }

    pub fn registry(&self) -> &Arc<AccountRegistry> {
        &self.inner.registry
    }

    pub fn tracker(&self) -> &Arc<HealthTracker> {
        &self.inner.tracker
    }

    pub fn router(&self) -> &AccountRouter {
        &self.inner.router
    }

    /// Flush everything that marks itself dirty; used by the snapshot tick
    /// and the shutdown path.
    pub fn flush(&self) {
        self.inner.events.save_if_dirty();
        self.inner.registry.save_if_dirty();
    }
}
