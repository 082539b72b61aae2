//! Metronome Client Implementation

use crate::api::Metronome;
use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use crate::types::{Embed, Payload};
use async_trait::async_trait;
use metronome_core::domain::{Job, JobStatus, Schedule};
use metronome_core::ValidationError;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Path segments of the v1 REST contract
mod segment {
    pub const V1: &str = "v1";
    pub const JOBS: &str = "jobs";
    pub const RUNS: &str = "runs";
    pub const SCHEDULES: &str = "schedules";
    pub const ACTION: &str = "action";
    pub const STOP: &str = "stop";
    pub const METRICS: &str = "metrics";
    pub const PING: &str = "ping";
}

const TIMESTAMP_QUERY_KEY: &str = "_timestamp";

const GET_JOB_EMBEDS: &[Embed] = &[Embed::HistorySummary, Embed::ActiveRuns, Embed::Schedules];
const LIST_JOBS_EMBEDS: &[Embed] = &[Embed::HistorySummary, Embed::ActiveRuns];
const RUNS_SINCE_EMBEDS: &[Embed] = &[
    Embed::History,
    Embed::HistorySummary,
    Embed::ActiveRuns,
    Embed::Schedules,
];

/// Status and body of a completed exchange
struct RawResponse {
    status: StatusCode,
    body: String,
}

impl RawResponse {
    fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

/// Metronome REST client
///
/// Holds no per-call state; clones share one connection pool and can be used
/// from many tasks at once.
///
/// # Example
///
/// ```no_run
/// use metronome_sdk::{ClientConfig, Metronome, MetronomeClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MetronomeClient::new(ClientConfig::new("http://127.0.0.1:9000"))?;
/// let jobs = client.list_jobs().await?;
/// println!("{} jobs", jobs.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MetronomeClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl MetronomeClient {
    /// Build a client for `config.base_url`
    ///
    /// Fails with [`SdkError::InvalidUrl`] when the base URL cannot carry a path.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SdkError::InvalidUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SdkError::Transport(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Build a client from `METRONOME_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SdkError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue one request and read the whole body
    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            if self.config.debug {
                if let Ok(json) = serde_json::to_string(body) {
                    debug!(method = %method, url = %url, body = %json, "Request body");
                }
            }
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&method, &url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&method, &url, e))?;

        if self.config.debug {
            debug!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %body,
                "Response body"
            );
        }

        Ok(RawResponse { status, body })
    }

    fn transport_error(&self, method: &Method, url: &Url, e: reqwest::Error) -> SdkError {
        if e.is_timeout() {
            error!(method = %method, url = %url, timeout = ?self.config.request_timeout, "Request timed out");
            SdkError::Timeout(self.config.request_timeout)
        } else {
            error!(method = %method, url = %url, error = %e, "Request failed");
            SdkError::Transport(e.to_string())
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let raw = self.send(Method::GET, segments, query, None::<&()>).await?;
        decode(success(raw)?)
    }

    /// Send and classify a reply whose body may be missing or loosely shaped
    async fn send_for_payload<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Payload<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = success(self.send(method, segments, &[], body).await?)?;
        decode_payload(raw)
    }

    /// PUT where a failure is reported with both the status and whatever
    /// could (or could not) be read from the body
    async fn put_update<T, B>(&self, op: &str, segments: &[&str], body: &B) -> Result<Payload<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = self.send(Method::PUT, segments, &[], Some(body)).await?;
        if !raw.status.is_success() {
            let status = raw.status.as_u16();
            let message = match serde_json::from_str::<serde_json::Value>(&raw.body) {
                Ok(value) => service_message(&value)
                    .unwrap_or_else(|| format!("{op} failed with status {status}: {value}")),
                Err(e) => format!("{op} failed with status {status}; body not decodable: {e}"),
            };
            warn!(op = %op, status = status, message = %message, "Update rejected");
            return Err(SdkError::Service {
                status,
                body: raw.body,
                message: Some(message),
            });
        }
        decode_payload(raw)
    }
}

/// Pass 2xx through; anything else becomes a service error carrying the body
fn success(raw: RawResponse) -> Result<RawResponse> {
    if raw.status.is_success() {
        return Ok(raw);
    }
    let status = raw.status.as_u16();
    let message = serde_json::from_str::<serde_json::Value>(&raw.body)
        .ok()
        .and_then(|value| service_message(&value));
    warn!(status = status, message = ?message, "Service returned an error");
    Err(SdkError::Service {
        status,
        body: raw.body,
        message,
    })
}

fn service_message(value: &serde_json::Value) -> Option<String> {
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(raw: RawResponse) -> Result<T> {
    serde_json::from_str(&raw.body).map_err(|e| {
        warn!(status = raw.status.as_u16(), error = %e, "Failed to decode response");
        SdkError::Decode {
            status: raw.status.as_u16(),
            reason: e.to_string(),
            body: raw.body,
        }
    })
}

fn decode_payload<T: DeserializeOwned>(raw: RawResponse) -> Result<Payload<T>> {
    let status = raw.status.as_u16();
    Payload::from_body(status, raw.reason(), &raw.body).map_err(|e| SdkError::Decode {
        status,
        reason: e.to_string(),
        body: raw.body,
    })
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::Required(field).into());
    }
    Ok(())
}

#[async_trait]
impl Metronome for MetronomeClient {
    async fn create_job(&self, job: &Job) -> Result<Job> {
        job.validate()?;
        let raw = self
            .send(Method::POST, &[segment::V1, segment::JOBS], &[], Some(job))
            .await?;
        let created: Job = decode(success(raw)?)?;
        info!(job_id = %created.id(), "Job created");
        Ok(created)
    }

    async fn get_job(&self, job_id: &str) -> Result<Job> {
        require(job_id, "jobId")?;
        self.get(
            &[segment::V1, segment::JOBS, job_id],
            &Embed::query(GET_JOB_EMBEDS),
        )
        .await
    }

    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let jobs: Vec<Job> = self
            .get(&[segment::V1, segment::JOBS], &Embed::query(LIST_JOBS_EMBEDS))
            .await?;
        debug!(count = jobs.len(), "Listed jobs");
        Ok(jobs)
    }

    async fn update_job(&self, job_id: &str, job: &Job) -> Result<Payload<Job>> {
        require(job_id, "jobId")?;
        job.validate()?;
        let reply = self
            .put_update("update job", &[segment::V1, segment::JOBS, job_id], job)
            .await?;
        info!(job_id = %job_id, "Job updated");
        Ok(reply)
    }

    async fn delete_job(&self, job_id: &str) -> Result<Payload<Job>> {
        require(job_id, "jobId")?;
        let reply = self
            .send_for_payload(
                Method::DELETE,
                &[segment::V1, segment::JOBS, job_id],
                None::<&()>,
            )
            .await?;
        info!(job_id = %job_id, "Job deleted");
        Ok(reply)
    }

    async fn list_runs_since(&self, job_id: &str, since_millis: i64) -> Result<Job> {
        require(job_id, "jobId")?;
        // Run history is only reachable through the job resource
        let mut query = vec![(TIMESTAMP_QUERY_KEY, since_millis.to_string())];
        query.extend(Embed::query(RUNS_SINCE_EMBEDS));
        self.get(&[segment::V1, segment::JOBS, job_id], &query).await
    }

    async fn list_run_statuses(&self, job_id: &str) -> Result<Vec<JobStatus>> {
        require(job_id, "jobId")?;
        self.get(&[segment::V1, segment::JOBS, job_id, segment::RUNS], &[])
            .await
    }

    async fn start_run(&self, job_id: &str) -> Result<Payload<JobStatus>> {
        require(job_id, "jobId")?;
        let reply: Payload<JobStatus> = self
            .send_for_payload(
                Method::POST,
                &[segment::V1, segment::JOBS, job_id, segment::RUNS],
                None::<&()>,
            )
            .await?;
        match reply.decoded() {
            Some(status) => info!(job_id = %job_id, run_id = %status.id, "Run started"),
            None => info!(job_id = %job_id, "Run started"),
        }
        Ok(reply)
    }

    async fn run_status(&self, job_id: &str, run_id: &str) -> Result<JobStatus> {
        require(job_id, "jobId")?;
        require(run_id, "runId")?;
        self.get(
            &[segment::V1, segment::JOBS, job_id, segment::RUNS, run_id],
            &[],
        )
        .await
    }

    async fn stop_run(&self, job_id: &str, run_id: &str) -> Result<Payload<JobStatus>> {
        require(job_id, "jobId")?;
        require(run_id, "runId")?;
        let reply = self
            .send_for_payload(
                Method::POST,
                &[
                    segment::V1,
                    segment::JOBS,
                    job_id,
                    segment::RUNS,
                    run_id,
                    segment::ACTION,
                    segment::STOP,
                ],
                None::<&()>,
            )
            .await?;
        info!(job_id = %job_id, run_id = %run_id, "Run stopped");
        Ok(reply)
    }

    async fn create_schedule(&self, job_id: &str, schedule: &Schedule) -> Result<Schedule> {
        require(job_id, "jobId")?;
        schedule.validate()?;
        let raw = self
            .send(
                Method::POST,
                &[segment::V1, segment::JOBS, job_id, segment::SCHEDULES],
                &[],
                Some(schedule),
            )
            .await?;
        let created: Schedule = decode(success(raw)?)?;
        info!(job_id = %job_id, schedule_id = %created.id, cron = %created.cron, "Schedule created");
        Ok(created)
    }

    async fn get_schedule(&self, job_id: &str, schedule_id: &str) -> Result<Schedule> {
        require(job_id, "jobId")?;
        require(schedule_id, "scheduleId")?;
        self.get(
            &[segment::V1, segment::JOBS, job_id, segment::SCHEDULES, schedule_id],
            &[],
        )
        .await
    }

    async fn list_schedules(&self, job_id: &str) -> Result<Vec<Schedule>> {
        require(job_id, "jobId")?;
        self.get(
            &[segment::V1, segment::JOBS, job_id, segment::SCHEDULES],
            &[],
        )
        .await
    }

    async fn update_schedule(
        &self,
        job_id: &str,
        schedule_id: &str,
        schedule: &Schedule,
    ) -> Result<Payload<Schedule>> {
        require(job_id, "jobId")?;
        require(schedule_id, "scheduleId")?;
        schedule.validate()?;
        let reply = self
            .put_update(
                "update schedule",
                &[segment::V1, segment::JOBS, job_id, segment::SCHEDULES, schedule_id],
                schedule,
            )
            .await?;
        info!(job_id = %job_id, schedule_id = %schedule_id, "Schedule updated");
        Ok(reply)
    }

    async fn delete_schedule(
        &self,
        job_id: &str,
        schedule_id: &str,
    ) -> Result<Payload<Schedule>> {
        require(job_id, "jobId")?;
        require(schedule_id, "scheduleId")?;
        let reply = self
            .send_for_payload(
                Method::DELETE,
                &[segment::V1, segment::JOBS, job_id, segment::SCHEDULES, schedule_id],
                None::<&()>,
            )
            .await?;
        info!(job_id = %job_id, schedule_id = %schedule_id, "Schedule deleted");
        Ok(reply)
    }

    async fn metrics(&self) -> Result<serde_json::Value> {
        self.get(&[segment::V1, segment::METRICS], &[]).await
    }

    async fn ping(&self) -> Result<String> {
        let raw = success(
            self.send(Method::GET, &[segment::V1, segment::PING], &[], None::<&()>)
                .await?,
        )?;
        // Some deployments answer with a JSON string instead of plain text
        Ok(serde_json::from_str::<String>(&raw.body).unwrap_or_else(|_| raw.body.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> MetronomeClient {
        MetronomeClient::new(ClientConfig::new(server.url())).unwrap()
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let result = MetronomeClient::new(ClientConfig::new("not a url"));
        assert!(matches!(result, Err(SdkError::InvalidUrl(_))));

        let result = MetronomeClient::new(ClientConfig::new("mailto:ops@example.com"));
        assert!(matches!(result, Err(SdkError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_keeps_base_path_and_escapes_ids() {
        let client =
            MetronomeClient::new(ClientConfig::new("http://gateway.local/service/metronome/"))
                .unwrap();
        let url = client.url(&["v1", "jobs", "a b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://gateway.local/service/metronome/v1/jobs/a%20b"
        );
    }

    #[tokio::test]
    async fn test_get_job_embeds_detail() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/jobs/prod")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("embed".into(), "historySummary".into()),
                Matcher::UrlEncoded("embed".into(), "activeRuns".into()),
                Matcher::UrlEncoded("embed".into(), "schedules".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "prod",
                    "description": "production backup",
                    "run": {"cpus": 0.5, "mem": 64, "disk": 10, "cmd": "backup.sh"},
                    "historySummary": {"successCount": 2, "failureCount": 0}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let job = client_for(&server).get_job("prod").await.unwrap();
        assert_eq!(job.id(), "prod");
        assert_eq!(job.run().cmd(), "backup.sh");
        assert_eq!(job.history_summary().unwrap().success_count, 2);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_job_posts_body() {
        let mut server = Server::new_async().await;
        let body = json!({
            "id": "prod",
            "description": "",
            "run": {"cpus": 1.0, "mem": 128, "disk": 8, "maxLaunchDelay": 0}
        });
        let mock = server
            .mock("POST", "/v1/jobs")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(body.clone()))
            .with_status(201)
            .with_body(body.to_string())
            .create_async()
            .await;

        let job = Job::new("prod", "", None, metronome_core::domain::Run::new(1.0, 128, 8).unwrap())
            .unwrap();
        let created = client_for(&server).create_job(&job).await.unwrap();
        assert_eq!(created, job);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_ids_fail_before_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server).run_status("prod", "").await.unwrap_err();
        assert!(matches!(
            err,
            SdkError::Validation(ValidationError::Required("runId"))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_failure_synthesizes_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/v1/jobs/prod")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let job = Job::new("prod", "", None, metronome_core::domain::Run::new(1.0, 32, 1).unwrap())
            .unwrap();
        let err = client_for(&server)
            .update_job("prod", &job)
            .await
            .unwrap_err();

        match err {
            SdkError::Service {
                status,
                body,
                message,
            } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
                let message = message.unwrap();
                assert!(message.starts_with("update job failed with status 502"));
                assert!(message.contains("not decodable"));
            }
            other => panic!("expected service error, got {other:?}"),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ping_plain_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/ping")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("pong\n")
            .create_async()
            .await;

        assert_eq!(client_for(&server).ping().await.unwrap(), "pong");

        mock.assert_async().await;
    }
}
