//! Metronome API port
//!
//! Every operation is one request/response exchange. None of them is retried
//! internally; creates and run starts are not idempotent, so retrying is left to
//! the caller.

use crate::error::Result;
use crate::types::Payload;
use async_trait::async_trait;
use metronome_core::domain::{Job, JobStatus, Schedule};

#[async_trait]
pub trait Metronome: Send + Sync {
    // Jobs

    /// `POST /v1/jobs`
    async fn create_job(&self, job: &Job) -> Result<Job>;

    /// `GET /v1/jobs/{id}` with history summary, active runs and schedules embedded
    async fn get_job(&self, job_id: &str) -> Result<Job>;

    /// `GET /v1/jobs` with history summary and active runs embedded
    async fn list_jobs(&self) -> Result<Vec<Job>>;

    /// `PUT /v1/jobs/{id}`
    async fn update_job(&self, job_id: &str, job: &Job) -> Result<Payload<Job>>;

    /// `DELETE /v1/jobs/{id}`
    async fn delete_job(&self, job_id: &str) -> Result<Payload<Job>>;

    // Runs

    /// `GET /v1/jobs/{id}?_timestamp=..` with full history embedded
    ///
    /// `since_millis` is a millisecond epoch timestamp.
    async fn list_runs_since(&self, job_id: &str, since_millis: i64) -> Result<Job>;

    /// `GET /v1/jobs/{id}/runs`
    async fn list_run_statuses(&self, job_id: &str) -> Result<Vec<JobStatus>>;

    /// `POST /v1/jobs/{id}/runs`
    async fn start_run(&self, job_id: &str) -> Result<Payload<JobStatus>>;

    /// `GET /v1/jobs/{id}/runs/{runId}`
    async fn run_status(&self, job_id: &str, run_id: &str) -> Result<JobStatus>;

    /// `POST /v1/jobs/{id}/runs/{runId}/action/stop`
    async fn stop_run(&self, job_id: &str, run_id: &str) -> Result<Payload<JobStatus>>;

    // Schedules

    /// `POST /v1/jobs/{id}/schedules`
    async fn create_schedule(&self, job_id: &str, schedule: &Schedule) -> Result<Schedule>;

    /// `GET /v1/jobs/{id}/schedules/{scheduleId}`
    async fn get_schedule(&self, job_id: &str, schedule_id: &str) -> Result<Schedule>;

    /// `GET /v1/jobs/{id}/schedules`
    async fn list_schedules(&self, job_id: &str) -> Result<Vec<Schedule>>;

    /// `PUT /v1/jobs/{id}/schedules/{scheduleId}`
    async fn update_schedule(
        &self,
        job_id: &str,
        schedule_id: &str,
        schedule: &Schedule,
    ) -> Result<Payload<Schedule>>;

    /// `DELETE /v1/jobs/{id}/schedules/{scheduleId}`
    async fn delete_schedule(&self, job_id: &str, schedule_id: &str)
        -> Result<Payload<Schedule>>;

    // Service

    /// `GET /v1/metrics`; the payload shape is service-defined
    async fn metrics(&self) -> Result<serde_json::Value>;

    /// `GET /v1/ping`
    async fn ping(&self) -> Result<String>;
}
