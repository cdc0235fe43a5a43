#![allow(clippy::unwrap_used)]
// Integration tests for the task monitor using wiremock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stormgr_api::{Error, MonitorOptions, Request, Session, SessionConfig, TaskOutcome, TaskStatus};

const TASK: &str = "3f8a9c1e-1111-4a2b-9c3d-000000000042";
const SHARE: &str = "e6023882-c570-47d5-a712-56198a3b6c18";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let session = Session::initialize(SessionConfig::new(server.uri())).unwrap();
    (server, session)
}

fn fast() -> MonitorOptions {
    MonitorOptions::new(Duration::from_millis(20), Duration::from_secs(5))
}

fn task_path() -> String {
    format!("/mgmt/rest/tasks/{TASK}")
}

fn task_body(status: &str, extra: Value) -> Value {
    let mut body = json!({"uuid": TASK, "status": status, "progress": 50});
    if let (Some(obj), Value::Object(more)) = (body.as_object_mut(), extra) {
        obj.extend(more);
    }
    body
}

async fn mount_task_started(server: &MockServer, verb: &str, resource: &str) {
    Mock::given(method(verb))
        .and(path(resource))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "objectIdentifier": {"uuid": TASK, "objectType": "TASK"}
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_task_status(server: &MockServer, body: Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(task_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

async fn task_fetches(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == task_path())
        .count()
}

// ── Completion ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_completed_task_resolves_entity() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/shares").await;
    mount_task_status(&server, task_body("RUNNING", json!({})), Some(2)).await;
    mount_task_status(
        &server,
        task_body(
            "COMPLETED",
            json!({"context": {
                "entity-uoid": format!("Uoid [uuid={SHARE}, objectType=SHARE]")
            }}),
        ),
        None,
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!("/mgmt/rest/shares/{SHARE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": SHARE,
            "name": "projects",
            "certificate": "internal"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = session
        .monitor(Request::post("shares").json(json!({"name": "projects"})), &fast())
        .await
        .unwrap();

    match outcome {
        TaskOutcome::Resolved { task, entity } => {
            assert_eq!(task.uuid, TASK);
            assert_eq!(task.status, TaskStatus::Completed);
            assert_eq!(entity["uuid"], json!(SHARE));
            // The resolved entity is a regular (formatted) read.
            assert_eq!(entity.get("certificate"), None);
        }
        other => panic!("expected Resolved, got: {other:?}"),
    }
    assert_eq!(task_fetches(&server).await, 3);
}

#[tokio::test]
async fn test_completed_task_without_reference_returns_task() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/users").await;
    mount_task_status(
        &server,
        task_body("COMPLETED", json!({"context": {"note": "user created"}})),
        None,
    )
    .await;

    let outcome = session
        .monitor(Request::post("users").json(json!({"name": "bob"})), &fast())
        .await
        .unwrap();

    match outcome {
        TaskOutcome::Completed(task) => {
            assert_eq!(task.uuid, TASK);
            assert_eq!(task.context["note"], json!("user created"));
        }
        other => panic!("expected Completed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unfetchable_entity_falls_back_to_task() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/shares").await;
    mount_task_status(
        &server,
        task_body(
            "COMPLETED",
            json!({"context": {"ref": format!("Uoid [uuid={SHARE}, objectType=SHARE]")}}),
        ),
        None,
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!("/mgmt/rest/shares/{SHARE}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = session
        .monitor(Request::post("shares").json(json!({})), &fast())
        .await
        .unwrap();
    assert!(matches!(outcome, TaskOutcome::Completed(_)), "got: {outcome:?}");
}

#[tokio::test]
async fn test_entity_collection_override() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/snapshots/actions/restore").await;
    mount_task_status(
        &server,
        task_body(
            "COMPLETED",
            json!({"context": {"ref": format!("Uoid [uuid={SHARE}, objectType=VOLUME]")}}),
        ),
        None,
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!("/mgmt/rest/volumes/{SHARE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "vol1"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = session
        .monitor(
            Request::post("snapshots/actions/restore").json(json!({})),
            &fast().entity_collection("volumes"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.into_value(), json!({"name": "vol1"}));
}

// ── Short-circuits ──────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_no_content_skips_polling() {
    let (server, session) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/mgmt/rest/shares/s1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = session
        .monitor(Request::delete("shares/s1"), &fast())
        .await
        .unwrap();
    assert_eq!(outcome, TaskOutcome::Deleted);
    assert_eq!(outcome.into_value(), Value::Bool(true));
    assert_eq!(task_fetches(&server).await, 0);
}

#[tokio::test]
async fn test_response_without_task_is_returned_unchanged() {
    let (server, session) = setup().await;
    let body = json!({"name": "home", "certificate": "kept"});

    Mock::given(method("PUT"))
        .and(path("/mgmt/rest/shares/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let outcome = session
        .monitor(Request::put("shares/s1").json(json!({"name": "home"})), &fast())
        .await
        .unwrap();
    assert_eq!(outcome, TaskOutcome::Untracked(body));
}

#[tokio::test]
async fn test_initial_failure_is_not_retried() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/rest/shares"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = session
        .monitor(Request::post("shares").json(json!({})), &fast())
        .await;
    assert!(
        matches!(result, Err(Error::Transport { status: Some(500), .. })),
        "got: {result:?}"
    );
}

// ── Failure paths ───────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_task_reports_status_message() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/volumes").await;
    mount_task_status(&server, task_body("RUNNING", json!({})), Some(1)).await;
    mount_task_status(
        &server,
        task_body("FAILED", json!({"statusMessage": "disk full"})),
        None,
    )
    .await;

    let options = MonitorOptions::new(Duration::from_millis(20), Duration::from_secs(10));
    let started = Instant::now();
    let result = session
        .monitor(Request::post("volumes").json(json!({"capacity": 1})), &options)
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("disk full"), "got: {err}");
    match err {
        Error::TaskFailed {
            uuid,
            status,
            message,
        } => {
            assert_eq!(uuid, TASK);
            assert_eq!(status, TaskStatus::Failed);
            assert_eq!(message.as_deref(), Some("disk full"));
        }
        other => panic!("expected TaskFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_canceled_task_fails() {
    let (server, session) = setup().await;
    mount_task_started(&server, "DELETE", "/mgmt/rest/volumes/v1").await;
    mount_task_status(&server, task_body("CANCELED", json!({})), None).await;

    let result = session
        .monitor(Request::delete("volumes/v1"), &fast())
        .await;
    assert!(
        matches!(
            result,
            Err(Error::TaskFailed {
                status: TaskStatus::Canceled,
                message: None,
                ..
            })
        ),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_transient_status_failures_keep_polling() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/users").await;

    Mock::given(method("GET"))
        .and(path(task_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(task_path()))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_task_status(&server, task_body("COMPLETED", json!({})), None).await;

    let outcome = session
        .monitor(Request::post("users").json(json!({})), &fast())
        .await
        .unwrap();
    assert!(matches!(outcome, TaskOutcome::Completed(_)), "got: {outcome:?}");
    assert_eq!(task_fetches(&server).await, 3);
}

#[tokio::test]
async fn test_timeout_stops_polling() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/shares").await;
    mount_task_status(&server, task_body("RUNNING", json!({})), None).await;

    let options = MonitorOptions::new(Duration::from_secs(1), Duration::from_secs(3));
    let started = Instant::now();
    let result = session
        .monitor(Request::post("shares").json(json!({})), &options)
        .await;
    let elapsed = started.elapsed();

    match result {
        Err(Error::TaskTimeout { ref uuid, elapsed: reported }) => {
            assert_eq!(uuid, TASK);
            assert!(reported >= Duration::from_secs(3), "reported {reported:?}");
        }
        other => panic!("expected TaskTimeout, got: {other:?}"),
    }
    assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "elapsed {elapsed:?}");

    let fetches = task_fetches(&server).await;
    assert!((3..=4).contains(&fetches), "fetches {fetches}");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(task_fetches(&server).await, fetches);
}

#[tokio::test]
async fn test_slow_status_fetch_is_cut_at_timeout() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/shares").await;
    Mock::given(method("GET"))
        .and(path(task_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_body("RUNNING", json!({})))
                .set_delay(Duration::from_secs(8)),
        )
        .mount(&server)
        .await;

    let options = MonitorOptions::new(Duration::from_secs(1), Duration::from_secs(2));
    let started = Instant::now();
    let result = session
        .monitor(Request::post("shares").json(json!({})), &options)
        .await;
    let elapsed = started.elapsed();

    assert!(
        matches!(result, Err(Error::TaskTimeout { .. })),
        "got: {result:?}"
    );
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
}

// ── Progress ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_progress_callback_sees_every_status() {
    let (server, session) = setup().await;
    mount_task_started(&server, "POST", "/mgmt/rest/shares").await;
    mount_task_status(&server, task_body("PENDING", json!({})), Some(1)).await;
    mount_task_status(&server, task_body("RUNNING", json!({})), Some(1)).await;
    mount_task_status(&server, task_body("COMPLETED", json!({})), None).await;

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let options = fast().on_progress(move |_task| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    session
        .monitor(Request::post("shares").json(json!({})), &options)
        .await
        .unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_fetch_task_reads_status() {
    let (server, session) = setup().await;
    mount_task_status(
        &server,
        task_body("RUNNING", json!({"statusMessage": "copying"})),
        None,
    )
    .await;

    let task = session.fetch_task(TASK).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.status_message.as_deref(), Some("copying"));
    assert_eq!(task.percent(), Some(50));
}
