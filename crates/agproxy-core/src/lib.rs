//! # agproxy-core
//!
//! Routing and reliability core for the Antigravity proxy.
//!
//! The crate owns all shared mutable state of the daemon and exposes it as
//! explicit long-lived services with injected collaborators (tests build
//! fresh instances over temp dirs; nothing is global):
//!
//! - [`config_store::ConfigStore`] - validated health/retention tunables
//! - [`registry::AccountRegistry`] - the account pool and its persistence
//! - [`health::HealthTracker`] - per-(account, model) scoring, auto-disable,
//!   auto-recovery
//! - [`events::EventStore`] / [`events::EventBroker`] - append-only event log
//!   with live fan-out
//! - [`issues::IssueTracker`] - event patterns rolled into operator incidents
//! - [`router::AccountRouter`] - account selection for inbound requests
//!
//! The HTTP surface lives in `agproxy-server`; the schema translation and
//! upstream transport layers are separate collaborators that call into this
//! crate to pick accounts and report outcomes.

pub mod config_store;
pub mod events;
pub mod health;
pub mod issues;
pub mod paths;
pub mod registry;
pub mod router;

pub use config_store::ConfigStore;
pub use events::{EventBroker, EventSink, EventStore, StreamFrame, Subscription};
pub use health::{HealthTracker, RequestError};
pub use issues::IssueTracker;
pub use registry::AccountRegistry;
pub use router::{AccountRouter, RouteSelection};
