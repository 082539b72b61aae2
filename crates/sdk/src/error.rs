//! SDK Error Types

use metronome_core::ValidationError;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
///
/// A timeout means the outcome is unknown: the service may still have acted on
/// the request.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error ({status}): {}", detail(.status, .message, .body))]
    Service {
        status: u16,
        body: String,
        message: Option<String>,
    },

    #[error("Decode error ({status}): {reason}")]
    Decode {
        status: u16,
        body: String,
        reason: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Service message, else the raw body, else the status text
fn detail(status: &u16, message: &Option<String>, body: &str) -> String {
    if let Some(message) = message {
        return message.clone();
    }
    if !body.trim().is_empty() {
        return body.to_string();
    }
    StatusCode::from_u16(*status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("empty response body")
        .to_string()
}

impl SdkError {
    /// HTTP status attached to the error, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Service { status, .. } | SdkError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body attached to the error
    pub fn body(&self) -> Option<&str> {
        match self {
            SdkError::Service { body, .. } | SdkError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SdkError::Timeout(_))
    }

    /// The request never completed (timeout or connection failure)
    pub fn is_transport(&self) -> bool {
        matches!(self, SdkError::Timeout(_) | SdkError::Transport(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::Service { status: 404, .. })
    }
}
