// Job Domain Model

use crate::domain::error::{Result, ValidationError};
use crate::domain::run::Run;
use crate::domain::schedule::Schedule;
use serde::{Deserialize, Serialize};

/// Job ID (service-side identifier, e.g. `prod.nightly.backup`)
pub type JobId = String;

/// Run ID assigned by the service when a run starts
pub type RunId = String;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub owner: String,
}

impl Labels {
    pub fn new(location: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            owner: owner.into(),
        }
    }
}

/// Snapshot of one run as reported by the service (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: RunId,
    pub job_id: JobId,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

/// Counters returned with `embed=historySummary`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub last_success_at: Option<String>,
    #[serde(default)]
    pub last_failure_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedRun {
    pub id: RunId,
    pub created_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
}

/// Run history returned with `embed=history`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub last_success_at: Option<String>,
    #[serde(default)]
    pub last_failure_at: Option<String>,
    #[serde(default)]
    pub successful_finished_runs: Vec<FinishedRun>,
    #[serde(default)]
    pub failed_finished_runs: Vec<FinishedRun>,
}

/// Job Entity
///
/// `id` and `run` are mandatory. The embedded detail (`active_runs`, `schedules`,
/// `history_summary`, `history`) only appears in replies to requests carrying the
/// matching embed selector and is never sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    id: JobId,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    labels: Option<Labels>,
    run: Run,

    #[serde(default, skip_serializing)]
    active_runs: Vec<JobStatus>,
    #[serde(default, skip_serializing)]
    schedules: Vec<Schedule>,
    #[serde(default, skip_serializing)]
    history_summary: Option<HistorySummary>,
    #[serde(default, skip_serializing)]
    history: Option<History>,
}

impl Job {
    /// Create a new Job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (must not be empty)
    /// * `description` - Free-form description
    /// * `labels` - Optional location/owner labels
    /// * `run` - Execution specification
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        labels: Option<Labels>,
        run: Run,
    ) -> Result<Self> {
        let mut builder = Self::builder(id).description(description).run(run);
        if let Some(labels) = labels {
            builder = builder.labels(labels);
        }
        builder.build()
    }

    pub fn builder(id: impl Into<String>) -> JobBuilder {
        JobBuilder::new(id)
    }

    /// Reopen this job for edits. Embedded read-only detail is dropped.
    pub fn into_builder(self) -> JobBuilder {
        JobBuilder {
            id: self.id,
            description: self.description,
            labels: self.labels,
            run: Some(self.run),
        }
    }

    /// Re-check the construction invariants, e.g. on a job decoded from a reply
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ValidationError::Required("Job.id"));
        }
        self.run.validate()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn active_runs(&self) -> &[JobStatus] {
        &self.active_runs
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn history_summary(&self) -> Option<&HistorySummary> {
        self.history_summary.as_ref()
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct JobBuilder {
    id: JobId,
    description: String,
    labels: Option<Labels>,
    run: Option<Run>,
}

impl JobBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            labels: None,
            run: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn run(mut self, run: Run) -> Self {
        self.run = Some(run);
        self
    }

    pub fn build(self) -> Result<Job> {
        if self.id.is_empty() {
            return Err(ValidationError::Required("Job.id"));
        }
        let run = self.run.ok_or(ValidationError::Required("Job.run"))?;
        run.validate()?;
        Ok(Job {
            id: self.id,
            description: self.description,
            labels: self.labels,
            run,
            active_runs: Vec::new(),
            schedules: Vec::new(),
            history_summary: None,
            history: None,
        })
    }
}
