//! Schedule construction with injected clock and id source

use crate::application::recurrence::{immediate_cron, Recurrence};
use crate::domain::error::{Result, ValidationError};
use crate::domain::schedule::{
    concurrency_policy, DEFAULT_STARTING_DEADLINE_SECONDS, DEFAULT_TIMEZONE,
};
use crate::domain::Schedule;
use crate::port::{IdProvider, TimeProvider};
use std::sync::Arc;
use tracing::debug;

/// Builds freshly identified schedules
///
/// Time and ids are injected so tests get deterministic output.
pub struct ScheduleFactory {
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
}

impl ScheduleFactory {
    pub fn new(time_provider: Arc<dyn TimeProvider>, id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            time_provider,
            id_provider,
        }
    }

    /// Schedule firing at the next UTC minute, allowing overlapping runs
    ///
    /// The cron fields come from the current clock and the timezone is fixed to
    /// UTC so the two agree.
    pub fn immediate(&self) -> Result<Schedule> {
        let now = self.time_provider.now_utc().ok_or_else(|| {
            let millis = self.time_provider.now_millis().to_string();
            ValidationError::recurrence(&millis, "clock outside representable range")
        })?;

        let schedule = Schedule {
            id: self.id_provider.generate_id(),
            cron: immediate_cron(now),
            concurrency_policy: concurrency_policy::ALLOW.to_string(),
            enabled: true,
            starting_deadline_seconds: DEFAULT_STARTING_DEADLINE_SECONDS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            next_run_at: None,
        };

        debug!(
            schedule_id = %schedule.id,
            cron = %schedule.cron,
            "Built immediate schedule"
        );
        Ok(schedule)
    }

    /// Schedule for an `R<n>/<start>/<interval>` expression
    pub fn from_recurrence(&self, expr: &str) -> Result<Schedule> {
        let recurrence = Recurrence::parse(expr)?;
        let schedule = recurrence.into_schedule(self.id_provider.generate_id())?;

        debug!(
            schedule_id = %schedule.id,
            expr = %expr,
            cron = %schedule.cron,
            repeat = recurrence.repeat(),
            "Translated recurrence"
        );
        Ok(schedule)
    }
}
