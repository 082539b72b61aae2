// Schedule Domain Model

use crate::domain::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// Concurrency policy tokens understood by the service
pub mod concurrency_policy {
    pub const ALLOW: &str = "ALLOW";
    pub const FORBID: &str = "FORBID";
    pub const REPLACE: &str = "REPLACE";
}

pub const DEFAULT_STARTING_DEADLINE_SECONDS: i64 = 60;
pub const DEFAULT_TIMEZONE: &str = "Etc/GMT";

/// Cron-based trigger attached to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub cron: String,
    #[serde(default)]
    pub concurrency_policy: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub starting_deadline_seconds: i64,
    #[serde(default)]
    pub timezone: String,
    /// Filled in by the service only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<String>,
}

impl Schedule {
    /// Create an enabled schedule that allows overlapping runs
    pub fn new(id: impl Into<String>, cron: impl Into<String>) -> Result<Self> {
        let schedule = Self {
            id: id.into(),
            cron: cron.into(),
            concurrency_policy: concurrency_policy::ALLOW.to_string(),
            enabled: true,
            starting_deadline_seconds: DEFAULT_STARTING_DEADLINE_SECONDS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            next_run_at: None,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check that id and cron are present
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ValidationError::Required("Schedule.id"));
        }
        if self.cron.is_empty() {
            return Err(ValidationError::Required("Schedule.cron"));
        }
        Ok(())
    }
}
