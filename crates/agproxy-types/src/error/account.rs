//! Account-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during account registry operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum AccountError {
    /// Account with given email not found
    #[error("Account not found: {email}")]
    NotFound {
        /// Email of the missing account
        email: String,
    },

    /// Account with given email already registered
    #[error("Account already exists: {email}")]
    AlreadyExists {
        /// Email of the duplicate account
        email: String,
    },

    /// Account storage/filesystem error
    #[error("Account storage error: {message}")]
    StorageError {
        /// Description of the storage failure
        message: String,
    },
}
