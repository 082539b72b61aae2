//! Simple SDK Example
//!
//! Registers a job, schedules one immediate run and prints what the service
//! reports back.
//!
//! # Usage
//!
//! 1. Point the client at a Metronome service:
//!    ```bash
//!    export METRONOME_URL=http://127.0.0.1:9000
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```
//!
//! Set `METRONOME_LOG_FORMAT=json` for JSON logs and `METRONOME_DEBUG=1` to log
//! request and response bodies.

use anyhow::Result;
use metronome_core::port::{SystemTimeProvider, UuidProvider};
use metronome_sdk::{
    ClientConfig, Job, Labels, Metronome, MetronomeClient, Payload, Run, ScheduleFactory,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const JOB_ID: &str = "example.hello";

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("METRONOME_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("metronome_sdk=debug,simple=info"))?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = ClientConfig::from_env();
    info!(url = %config.base_url, "Connecting to Metronome");
    let client = MetronomeClient::new(config)?;

    // 1. Liveness
    let pong = client.ping().await?;
    info!(reply = %pong, "Service is up");

    // 2. Existing jobs
    let jobs = client.list_jobs().await?;
    info!(count = jobs.len(), "Jobs registered");
    for job in &jobs {
        info!(
            job_id = %job.id(),
            active_runs = job.active_runs().len(),
            "Existing job"
        );
    }

    // 3. Register a job
    let run = Run::builder(0.1, 32, 1)
        .cmd("echo hello from metronome")
        .max_launch_delay(3600)
        .build()?;
    let job = Job::new(
        JOB_ID,
        "says hello once",
        Some(Labels::new("lab", "examples")),
        run,
    )?;
    let created = client.create_job(&job).await?;
    info!(job_id = %created.id(), "Job registered");

    // 4. Schedule it for the current minute
    let factory = ScheduleFactory::new(Arc::new(SystemTimeProvider), Arc::new(UuidProvider));
    let schedule = factory.immediate()?;
    let schedule = client.create_schedule(created.id(), &schedule).await?;
    info!(schedule_id = %schedule.id, cron = %schedule.cron, "Schedule attached");

    // 5. Start a run right away as well
    match client.start_run(created.id()).await? {
        Payload::Decoded(status) => info!(run_id = %status.id, status = %status.status, "Run started"),
        Payload::Raw(value) => warn!(reply = %value, "Run started with an unexpected reply"),
        Payload::Empty { status, reason } => info!(status, reason = %reason, "Run started"),
    }

    let statuses = client.list_run_statuses(created.id()).await?;
    info!(count = statuses.len(), "Active runs");

    Ok(())
}
