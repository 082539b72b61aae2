// Domain Layer - Wire-contract entities and value types

pub mod error;
pub mod job;
pub mod run;
pub mod schedule;
pub mod values;

// Re-exports
pub use error::ValidationError;
pub use job::{
    FinishedRun, History, HistorySummary, Job, JobBuilder, JobId, JobStatus, Labels, RunId,
};
pub use run::{Artifact, Constraint, Docker, Placement, Restart, Run, RunBuilder, Volume};
pub use schedule::{concurrency_policy, Schedule};
pub use values::{ContainerPath, MountMode, Operator};
