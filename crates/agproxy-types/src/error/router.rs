//! Routing errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by account selection.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum RouterError {
    /// Every account in the pool is disabled, unhealthy, or manually excluded
    /// for the requested model. Callers translate this to an upstream 503.
    #[error("No usable account for model {model}")]
    NoUsableAccount {
        /// Model that could not be routed
        model: String,
    },
}

impl RouterError {
    /// Stable machine-readable reason code for API responses.
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::NoUsableAccount { .. } => "no_usable_account",
        }
    }
}
