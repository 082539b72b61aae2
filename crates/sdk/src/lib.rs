//! Metronome SDK - Rust Client Library
//!
//! Typed client for the Metronome job scheduler REST API (v1).
//!
//! # Example
//!
//! ```no_run
//! use metronome_sdk::{ClientConfig, Job, Metronome, MetronomeClient, Run, Schedule};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MetronomeClient::new(ClientConfig::new("http://127.0.0.1:9000"))?;
//!
//!     // Register a job
//!     let run = Run::builder(0.5, 64, 16).cmd("backup.sh").build()?;
//!     let job = client
//!         .create_job(&Job::new("prod.backup", "nightly backup", None, run)?)
//!         .await?;
//!
//!     // Run it every night at 02:00
//!     let schedule = Schedule::new("nightly", "0 2 * * *")?;
//!     client.create_schedule(job.id(), &schedule).await?;
//!
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod config;
mod error;
mod types;

pub use api::Metronome;
pub use client::MetronomeClient;
pub use config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_URL};
pub use error::{Result, SdkError};
pub use types::{Embed, Payload};

// Domain types callers need to build requests and read replies
pub use metronome_core::application::{format_recurrence, Recurrence, ScheduleFactory};
pub use metronome_core::domain::{
    concurrency_policy, Artifact, Constraint, Docker, History, HistorySummary, Job, JobBuilder,
    JobStatus, Labels, MountMode, Operator, Placement, Restart, Run, RunBuilder, Schedule, Volume,
};
pub use metronome_core::ValidationError;
