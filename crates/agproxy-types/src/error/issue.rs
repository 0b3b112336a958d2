//! Issue lifecycle errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when transitioning an issue.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum IssueError {
    /// No issue with the given id
    #[error("Issue not found: {id}")]
    NotFound {
        /// Id of the missing issue
        id: String,
    },

    /// Resolution is terminal; resolved issues accept no further transitions
    #[error("Issue {id} is already resolved")]
    AlreadyResolved {
        /// Id of the resolved issue
        id: String,
    },
}
