//! Domain models for the Antigravity proxy.

mod account;
mod config;
mod event;
mod health;
mod issue;

pub use account::Account;
pub use config::{HealthConfig, HealthConfigPatch};
pub use event::{
    EventDraft, EventFilter, EventPage, EventSeverity, EventStats, EventType, ProxyEvent,
    RequestStats,
};
pub use health::{
    AccountHealthRow, HealthChange, HealthMatrix, HealthRecord, HealthStatus, HealthSummary,
    LastError,
};
pub use issue::{Issue, IssueSeverity, IssueStats, IssueStatus, IssueType};
