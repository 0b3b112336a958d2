//! Per-(account, model) health tracking.
//!
//! The tracker scores every pair from its success/failure counters, trips
//! auto-disable on failure streaks, and applies the two recovery paths:
//! first success after an auto-disable, or the configured cooldown observed
//! by [`HealthTracker::is_model_usable`].

mod tracker;


pub use tracker::{HealthTracker, RequestError};
