//! Schedule operations against a mock Metronome service

use metronome_core::port::{IdProvider, TimeProvider};
use metronome_sdk::{
    ClientConfig, Metronome, MetronomeClient, Payload, Recurrence, Schedule, ScheduleFactory,
    SdkError, ValidationError,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

const EVERY2: &str = r#"{"id":"every2","cron":"*/2 * * * *","concurrencyPolicy":"ALLOW","enabled":true,"startingDeadlineSeconds":60,"timezone":"Etc/GMT"}"#;

struct FixedClock(i64);

impl TimeProvider for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

struct FixedId(&'static str);

impl IdProvider for FixedId {
    fn generate_id(&self) -> String {
        self.0.to_string()
    }
}

fn client_for(server: &Server) -> MetronomeClient {
    MetronomeClient::new(ClientConfig::new(server.url())).unwrap()
}

fn every2() -> Schedule {
    serde_json::from_str(EVERY2).unwrap()
}

#[tokio::test]
async fn test_create_schedule_from_recurrence() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/jobs/prod/schedules")
        .match_body(Matcher::JsonString(EVERY2.to_string()))
        .with_status(201)
        .with_body(EVERY2)
        .create_async()
        .await;

    let schedule = Recurrence::parse("R100//PT2M")
        .unwrap()
        .into_schedule("every2")
        .unwrap();
    let created = client_for(&server)
        .create_schedule("prod", &schedule)
        .await
        .unwrap();
    assert_eq!(created, every2());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_immediate_schedule() {
    let mut server = Server::new_async().await;
    let expected = json!({
        "id": "now-1",
        "cron": "3 13 15 7 *",
        "concurrencyPolicy": "ALLOW",
        "enabled": true,
        "startingDeadlineSeconds": 60,
        "timezone": "Etc/GMT"
    });
    let mock = server
        .mock("POST", "/v1/jobs/prod/schedules")
        .match_body(Matcher::Json(expected.clone()))
        .with_status(201)
        .with_body(expected.to_string())
        .create_async()
        .await;

    let factory = ScheduleFactory::new(
        Arc::new(FixedClock(1_468_587_779_735)),
        Arc::new(FixedId("now-1")),
    );
    let schedule = factory.immediate().unwrap();
    let created = client_for(&server)
        .create_schedule("prod", &schedule)
        .await
        .unwrap();
    assert_eq!(created.cron, "3 13 15 7 *");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_and_list_schedules() {
    let mut server = Server::new_async().await;
    let get = server
        .mock("GET", "/v1/jobs/prod/schedules/every2")
        .with_status(200)
        .with_body(EVERY2)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/v1/jobs/prod/schedules")
        .with_status(200)
        .with_body(format!("[{EVERY2}]"))
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.get_schedule("prod", "every2").await.unwrap(),
        every2()
    );
    assert_eq!(client.list_schedules("prod").await.unwrap(), vec![every2()]);

    get.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_update_schedule() {
    let mut server = Server::new_async().await;
    let mut schedule = every2();
    schedule.enabled = false;
    let mock = server
        .mock("PUT", "/v1/jobs/prod/schedules/every2")
        .match_body(Matcher::PartialJson(json!({"enabled": false})))
        .with_status(200)
        .with_body(serde_json::to_string(&schedule).unwrap())
        .create_async()
        .await;

    let reply = client_for(&server)
        .update_schedule("prod", "every2", &schedule)
        .await
        .unwrap();
    assert_eq!(reply, Payload::Decoded(schedule));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_schedule_empty_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/v1/jobs/prod/schedules/every2")
        .with_status(200)
        .create_async()
        .await;

    let reply = client_for(&server)
        .delete_schedule("prod", "every2")
        .await
        .unwrap();
    assert!(reply.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_schedule_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/v1/jobs/prod/schedules/missing")
        .with_status(404)
        .with_body(r#"{"message":"Schedule not found"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .delete_schedule("prod", "missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_schedule_never_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut schedule = every2();
    schedule.cron.clear();
    let err = client_for(&server)
        .create_schedule("prod", &schedule)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SdkError::Validation(ValidationError::Required("Schedule.cron"))
    ));

    mock.assert_async().await;
}
