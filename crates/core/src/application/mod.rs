// Application Layer - Recurrence translation and schedule construction

pub mod recurrence;
pub mod schedule_factory;

// Re-exports
pub use recurrence::{
    format_recurrence, immediate_cron, IsoDuration, Recurrence, RecurrenceStart,
};
pub use schedule_factory::ScheduleFactory;
