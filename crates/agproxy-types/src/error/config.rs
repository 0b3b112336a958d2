//! Configuration errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed field in a configuration update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the field that failed validation (wire name, camelCase)
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// One or more fields of a patch failed validation.
    ///
    /// Carries every failing field; the patch is never partially applied.
    #[error("Invalid config: {}", errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation {
        /// All failing fields with messages
        errors: Vec<FieldError>,
    },

    /// Config storage/filesystem error
    #[error("Config storage error: {message}")]
    StorageError {
        /// Description of the storage failure
        message: String,
    },
}
