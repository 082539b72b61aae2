//! Response shapes and query selectors

use serde::de::DeserializeOwned;

/// Reply of an operation whose body shape the service does not pin down.
///
/// Typed where the body matches the expected entity, raw JSON where it does not,
/// and a status placeholder when the service sent no body at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Decoded(T),
    Raw(serde_json::Value),
    Empty { status: u16, reason: String },
}

impl<T: DeserializeOwned> Payload<T> {
    /// Classify a successful response body.
    ///
    /// Fails only when the body is neither empty nor JSON.
    pub(crate) fn from_body(status: u16, reason: &str, body: &str) -> serde_json::Result<Self> {
        if body.trim().is_empty() {
            return Ok(Payload::Empty {
                status,
                reason: reason.to_string(),
            });
        }
        let value: serde_json::Value = serde_json::from_str(body)?;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(decoded) => Ok(Payload::Decoded(decoded)),
            Err(_) => Ok(Payload::Raw(value)),
        }
    }
}

impl<T> Payload<T> {
    pub fn decoded(&self) -> Option<&T> {
        match self {
            Payload::Decoded(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_decoded(self) -> Option<T> {
        match self {
            Payload::Decoded(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty { .. })
    }
}

/// Embed selector: asks the service to inline extra detail into a job reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embed {
    History,
    HistorySummary,
    ActiveRuns,
    Schedules,
}

impl Embed {
    pub const QUERY_KEY: &'static str = "embed";

    pub fn as_str(&self) -> &'static str {
        match self {
            Embed::History => "history",
            Embed::HistorySummary => "historySummary",
            Embed::ActiveRuns => "activeRuns",
            Embed::Schedules => "schedules",
        }
    }

    /// Render as repeated `embed=` query pairs
    pub fn query(selectors: &[Embed]) -> Vec<(&'static str, String)> {
        selectors
            .iter()
            .map(|e| (Self::QUERY_KEY, e.as_str().to_string()))
            .collect()
    }
}
