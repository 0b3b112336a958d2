//! Typed error definitions for the Antigravity proxy.
//!
//! This module provides a structured error hierarchy with specific error types
//! for different domains. All errors are designed to be:
//!
//! - **Serializable** for API responses via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants
//! - **Composable** via thiserror derive macros

mod account;
mod config;
mod issue;
mod router;

pub use account::AccountError;
pub use config::{ConfigError, FieldError};
pub use issue::IssueError;
pub use router::RouterError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type that wraps all domain-specific errors.
///
/// Use this when a single error type must represent any proxy error.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "domain", content = "error")]
pub enum TypedError {
    /// Wraps an account-related error
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Wraps a configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Wraps a routing error
    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    /// Wraps an issue lifecycle error
    #[error("Issue error: {0}")]
    Issue(#[from] IssueError),
}

/// Standard Result type using TypedError.
pub type Result<T> = std::result::Result<T, TypedError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = TypedError::Account(AccountError::NotFound {
            email: "ops@example.com".to_string(),
        });

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Account"));
        assert!(json.contains("ops@example.com"));

        let deserialized: TypedError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = RouterError::NoUsableAccount { model: "gemini-3-pro".to_string() };

        let msg = format!("{}", err);
        assert!(msg.contains("gemini-3-pro"));
    }
}
