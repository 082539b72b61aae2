//! Run operations against a mock Metronome service

use metronome_sdk::{ClientConfig, Metronome, MetronomeClient, Payload, SdkError};
use mockito::{Matcher, Server};
use serde_json::json;

const RUN_ID: &str = "20160715130259A34HX";

fn client_for(server: &Server) -> MetronomeClient {
    MetronomeClient::new(ClientConfig::new(server.url())).unwrap()
}

fn starting_status() -> serde_json::Value {
    json!({
        "completedAt": null,
        "createdAt": "2016-07-15T13:02:59.735+0000",
        "id": RUN_ID,
        "jobId": "prod",
        "status": "STARTING",
        "tasks": []
    })
}

#[tokio::test]
async fn test_start_run_returns_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/jobs/prod/runs")
        .with_status(201)
        .with_body(starting_status().to_string())
        .expect(1)
        .create_async()
        .await;

    let reply = client_for(&server).start_run("prod").await.unwrap();
    let status = reply.into_decoded().unwrap();
    assert_eq!(status.id, RUN_ID);
    assert_eq!(status.job_id, "prod");
    assert_eq!(status.status, "STARTING");
    assert!(status.completed_at.is_none());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_start_run_unknown_job() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/jobs/nope/runs")
        .with_status(404)
        .with_body(r#"{"message":"Job not found"}"#)
        .create_async()
        .await;

    let err = client_for(&server).start_run("nope").await.unwrap_err();
    assert!(err.is_not_found());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_run_status() {
    let mut server = Server::new_async().await;
    let mut finished = starting_status();
    finished["status"] = json!("SUCCESS");
    finished["completedAt"] = json!("2016-07-15T13:03:30.000+0000");
    let mock = server
        .mock("GET", format!("/v1/jobs/prod/runs/{RUN_ID}").as_str())
        .with_status(200)
        .with_body(finished.to_string())
        .create_async()
        .await;

    let status = client_for(&server).run_status("prod", RUN_ID).await.unwrap();
    assert_eq!(status.status, "SUCCESS");
    assert_eq!(
        status.completed_at.as_deref(),
        Some("2016-07-15T13:03:30.000+0000")
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_stop_run_uses_action_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            format!("/v1/jobs/prod/runs/{RUN_ID}/action/stop").as_str(),
        )
        .with_status(200)
        .create_async()
        .await;

    let reply = client_for(&server).stop_run("prod", RUN_ID).await.unwrap();
    assert!(reply.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_stop_run_already_finished() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            format!("/v1/jobs/prod/runs/{RUN_ID}/action/stop").as_str(),
        )
        .with_status(404)
        .with_body(r#"{"message":"Run not found"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .stop_run("prod", RUN_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Service { status: 404, .. }));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_run_statuses() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/jobs/prod/runs")
        .with_status(200)
        .with_body(json!([starting_status()]).to_string())
        .create_async()
        .await;

    let statuses = client_for(&server).list_run_statuses("prod").await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].id, RUN_ID);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_runs_since_sends_timestamp_and_history_embeds() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/jobs/prod")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("_timestamp".into(), "1468587779735".into()),
            Matcher::UrlEncoded("embed".into(), "history".into()),
            Matcher::UrlEncoded("embed".into(), "historySummary".into()),
            Matcher::UrlEncoded("embed".into(), "activeRuns".into()),
            Matcher::UrlEncoded("embed".into(), "schedules".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "id": "prod",
                "run": {"cpus": 1.0, "mem": 32, "disk": 1},
                "activeRuns": [starting_status()],
                "history": {
                    "successCount": 1,
                    "failureCount": 1,
                    "lastSuccessAt": "2016-07-15T12:00:10.000+0000",
                    "lastFailureAt": "2016-07-15T11:00:10.000+0000",
                    "successfulFinishedRuns": [
                        {"id": "20160715120000ABCDE", "createdAt": "2016-07-15T12:00:00.000+0000",
                         "finishedAt": "2016-07-15T12:00:10.000+0000"}
                    ],
                    "failedFinishedRuns": [
                        {"id": "20160715110000VWXYZ", "createdAt": "2016-07-15T11:00:00.000+0000",
                         "finishedAt": "2016-07-15T11:00:10.000+0000"}
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let job = client_for(&server)
        .list_runs_since("prod", 1_468_587_779_735)
        .await
        .unwrap();
    assert_eq!(job.active_runs().len(), 1);
    let history = job.history().unwrap();
    assert_eq!(history.successful_finished_runs[0].id, "20160715120000ABCDE");
    assert_eq!(history.failed_finished_runs.len(), 1);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_start_run_non_status_reply_kept_raw() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/jobs/prod/runs")
        .with_status(201)
        .with_body(r#"{"accepted":true}"#)
        .create_async()
        .await;

    let reply = client_for(&server).start_run("prod").await.unwrap();
    assert_eq!(reply, Payload::Raw(json!({"accepted": true})));

    mock.assert_async().await;
}
