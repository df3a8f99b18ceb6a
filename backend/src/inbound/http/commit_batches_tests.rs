//! Tests for commit batch review HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::rollback::BatchId;
use crate::domain::{BatchRollbackService, CommitBatch, CommitBatchKey, RecordTables};
use crate::outbound::memory::{InMemoryCommitBatchRepository, InMemoryRecordStore};

const ROLLBACK_URI: &str = "/api/church/46/ocr/jobs/42/review/rollback-batch";
const BATCHES_URI: &str = "/api/church/46/ocr/jobs/42/review/commit-batches";
const ACTOR: &str = "admin@test.com";

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 27, 12, 30, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

struct Harness {
    batches: Arc<InMemoryCommitBatchRepository>,
    records: Arc<InMemoryRecordStore>,
}

impl Harness {
    fn new() -> Self {
        let harness = Self {
            batches: Arc::new(InMemoryCommitBatchRepository::new()),
            records: Arc::new(InMemoryRecordStore::new()),
        };
        harness.batches.insert(CommitBatch {
            key: CommitBatchKey::new(46, 42, BatchId::new("batch-1").expect("valid batch id")),
            created_at: Utc
                .with_ymd_and_hms(2026, 2, 27, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            plan: Some(json!({ "method": "autocommit_v1", "eligible_count": 3 })),
            results: Some(json!({
                "method": "autocommit_v1",
                "rows": [
                    { "candidateIndex": 0, "outcome": "committed", "recordId": 100, "table": "baptism_records" },
                    { "candidateIndex": 1, "outcome": "skipped" },
                    { "candidateIndex": 2, "outcome": "committed", "recordId": 101, "table": "baptism_records" },
                    { "candidateIndex": 3, "outcome": "committed", "recordId": 200, "table": "marriage_records" },
                ]
            })),
            rollback: None,
        });
        harness
    }

    fn state(&self) -> HttpState {
        HttpState::from_service(Arc::new(BatchRollbackService::new(
            self.batches.clone(),
            self.records.clone(),
            RecordTables::default(),
            Arc::new(FixtureClock),
        )))
    }
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api")
            .service(list_commit_batches)
            .service(rollback_commit_batch),
    )
}

async fn post_rollback(state: HttpState, body: Value) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let request = actix_test::TestRequest::post()
        .uri(ROLLBACK_URI)
        .insert_header((AUTHENTICATED_USER_HEADER, ACTOR))
        .set_json(&body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}

#[actix_web::test]
async fn dry_run_reports_counts_without_deleting() {
    let harness = Harness::new();
    harness.records.insert("baptism_records", [100]);
    harness.records.insert("marriage_records", [200]);

    let (status, body) = post_rollback(
        harness.state(),
        json!({ "batch_id": "batch-1", "dry_run": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "ok": true,
            "dry_run": true,
            "batch_id": "batch-1",
            "deleted": { "baptism_records": 1, "marriage_records": 1 },
            "missing": { "baptism_records": 1, "marriage_records": 0 },
            "total_would_delete": 2,
            "total_missing": 1
        })
    );
    assert_eq!(harness.records.ids("baptism_records"), [100]);
}

#[actix_web::test]
async fn rollback_deletes_records_and_returns_audit_artifact() {
    let harness = Harness::new();
    harness.records.insert("baptism_records", [100, 101, 555]);
    harness.records.insert("marriage_records", [200]);

    let (status, body) = post_rollback(harness.state(), json!({ "batch_id": "batch-1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["dry_run"], json!(false));
    assert_eq!(body["total_deleted"], json!(3));
    assert_eq!(body["total_missing"], json!(0));
    assert_eq!(body["rollback"]["method"], json!("autocommit_rollback_v1"));
    assert_eq!(body["rollback"]["rolled_back_by"], json!(ACTOR));
    assert_eq!(body["rollback"]["rolled_back_at"], json!("2026-02-27T12:30:00.000Z"));
    assert_eq!(harness.records.ids("baptism_records"), [555]);
    assert!(harness.records.ids("marriage_records").is_empty());
}

#[actix_web::test]
async fn missing_records_conflict_until_forced() {
    let harness = Harness::new();
    harness.records.insert("baptism_records", [100]);
    harness.records.insert("marriage_records", [200]);

    let (status, body) = post_rollback(harness.state(), json!({ "batch_id": "batch-1" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("conflict"));
    assert_eq!(
        body["details"],
        json!({ "missing": { "baptism_records": 1, "marriage_records": 0 }, "total_missing": 1 })
    );
    assert_eq!(harness.records.ids("baptism_records"), [100]);

    let (status, body) = post_rollback(
        harness.state(),
        json!({ "batch_id": "batch-1", "force": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rollback"]["force"], json!(true));
    assert_eq!(body["rollback"]["missing_ids"], json!({ "baptism_records": [101], "marriage_records": [] }));
}

#[actix_web::test]
async fn second_rollback_conflicts_without_force() {
    let harness = Harness::new();
    harness.records.insert("baptism_records", [100, 101]);
    harness.records.insert("marriage_records", [200]);

    let (first, _) = post_rollback(harness.state(), json!({ "batch_id": "batch-1" })).await;
    let (second, body) = post_rollback(harness.state(), json!({ "batch_id": "batch-1" })).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("already rolled back"))
    );
}

#[rstest]
#[case(json!({ "batch_id": "unknown" }), StatusCode::NOT_FOUND)]
#[case(json!({ "batch_id": "   " }), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn request_errors_map_to_statuses(#[case] body: Value, #[case] expected: StatusCode) {
    let harness = Harness::new();

    let (status, _) = post_rollback(harness.state(), body).await;

    assert_eq!(status, expected);
}

#[actix_web::test]
async fn rollback_without_actor_is_unauthorised() {
    let app = actix_test::init_service(test_app(Harness::new().state())).await;
    let request = actix_test::TestRequest::post()
        .uri(ROLLBACK_URI)
        .set_json(json!({ "batch_id": "batch-1" }))
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn list_batches_reports_rollback_state() {
    let harness = Harness::new();
    harness.records.insert("baptism_records", [100, 101]);
    harness.records.insert("marriage_records", [200]);
    let state = harness.state();
    let (status, _) = post_rollback(state.clone(), json!({ "batch_id": "batch-1" })).await;
    assert_eq!(status, StatusCode::OK);

    let app = actix_test::init_service(test_app(state)).await;
    let request = actix_test::TestRequest::get()
        .uri(BATCHES_URI)
        .insert_header((AUTHENTICATED_USER_HEADER, ACTOR))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;

    let batches = body["batches"].as_array().expect("batches array");
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0]["batch_id"], json!("batch-1"));
    assert_eq!(batches[0]["committed_count"], json!(3));
    assert_eq!(batches[0]["rolled_back"], json!(true));
    assert_eq!(batches[0]["plan"]["eligible_count"], json!(3));
    assert_eq!(batches[0]["rollback"]["total_deleted"], json!(3));
}

#[actix_web::test]
async fn fixture_state_lists_nothing() {
    let app = actix_test::init_service(test_app(HttpState::default())).await;
    let request = actix_test::TestRequest::get()
        .uri(BATCHES_URI)
        .insert_header((AUTHENTICATED_USER_HEADER, ACTOR))
        .to_request();

    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body, json!({ "batches": [] }));
}
