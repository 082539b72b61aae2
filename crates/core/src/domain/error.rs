// Domain Error Types

use thiserror::Error;

/// A locally built value violates a wire-contract invariant.
///
/// Raised before any request leaves the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required by the metronome api")]
    Required(&'static str),

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: String },

    #[error("unknown constraint operator '{0}': must be EQ, LIKE or UNLIKE")]
    UnknownOperator(String),

    #[error("unknown mount mode '{0}': must be RO or RW")]
    UnknownMountMode(String),

    #[error("bad container path '{0}': must match `^/[^/].*$`")]
    ContainerPath(String),

    #[error("malformed recurrence '{input}': {reason}")]
    Recurrence { input: String, reason: String },

    #[error("{0} string not formatted correctly")]
    Format(&'static str),
}

impl ValidationError {
    pub(crate) fn recurrence(input: &str, reason: impl Into<String>) -> Self {
        ValidationError::Recurrence {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
