//! # agproxy-types
//!
//! Core types, models, and error definitions for the Antigravity proxy.
//!
//! This crate provides the foundational type system for the proxy:
//!
//! - **`error`** - Typed error hierarchy for accounts, config, routing, and issues
//! - **`models`** - Domain models (Account, HealthRecord, ProxyEvent, Issue, HealthConfig)
//!
//! `agproxy-types` sits at the bottom of the dependency graph; both
//! `agproxy-core` and `agproxy-server` build on it.
//!
//! All types are designed to be:
//! - **Serializable** via serde for the dashboard API and on-disk snapshots
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** where testing needs comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{AccountError, ConfigError, FieldError, IssueError, Result, RouterError, TypedError};

// Re-export core model types
pub use models::{
    Account, AccountHealthRow, EventDraft, EventFilter, EventPage, EventSeverity, EventStats,
    EventType, HealthChange, HealthConfig, HealthConfigPatch, HealthMatrix, HealthRecord,
    HealthStatus, HealthSummary, Issue, IssueSeverity, IssueStats, IssueStatus, IssueType,
    LastError, ProxyEvent, RequestStats,
};
