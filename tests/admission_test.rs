//! Integration tests for job admission, upload and status polling.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use helpers::{DownBlobs, TestApp, multipart_request};

#[tokio::test]
async fn test_submission_is_queued_immediately() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/quote",
            Some(json!({
                "download_url": "https://files.example/bracket.stl",
                "material": "PETG",
                "infill": 20,
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    let job_id = response.body["job_id"].as_str().unwrap().to_string();
    assert!(response.body["message"].as_str().unwrap().contains(&job_id));

    let status = app.status(&job_id).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["status"], "queued");
    assert!(status.body.get("data").is_none());
    assert!(status.body.get("error").is_none());
    assert_eq!(app.queue_len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_get_unique_ids() {
    const SUBMISSIONS: usize = 1_000;
    let app = TestApp::new().await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..SUBMISSIONS {
        let router = app.router.clone();
        tasks.spawn(async move {
            let req = axum::http::Request::builder()
                .method("POST")
                .uri("/quote")
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from(
                    r#"{"download_url": "https://files.example/a.stl", "infill": 15}"#,
                ))
                .unwrap();
            let response = router.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
            let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            body["job_id"].as_str().unwrap().to_string()
        });
    }
    let mut ids = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        assert!(ids.insert(joined.unwrap()));
    }

    assert_eq!(ids.len(), SUBMISSIONS);
    assert_eq!(app.queue_len().await, SUBMISSIONS as u64);
    for id in &ids {
        assert_eq!(app.status(id).await.body["status"], "queued");
    }
}

#[tokio::test]
async fn test_missing_infill_is_rejected_without_side_effects() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/quote",
            Some(json!({"download_url": "https://files.example/a.stl"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(response.body["message"].as_str().unwrap().contains("infill"));
    assert_eq!(app.queue_len().await, 0);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_missing_download_url_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request("POST", "/quote", Some(json!({"infill": 15})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.queue_len().await, 0);
}

#[tokio::test]
async fn test_out_of_range_infill_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/quote",
            Some(json!({"download_url": "https://files.example/a.stl", "infill": 120})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = TestApp::new().await;
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/quote")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = TestApp::new().await;
    let response = app.status("00000000-0000-4000-8000-000000000000").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_job_id_is_not_found() {
    let app = TestApp::new().await;
    let response = app.status("not-a-uuid").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_status_expires_after_ttl() {
    let mut config = helpers::default_config();
    config.store.job_ttl_seconds = 60;
    let app = TestApp::with_config(config).await;

    let job_id = app
        .submit(json!({"download_url": "https://files.example/a.stl", "infill": 15}))
        .await;
    assert_eq!(app.status(&job_id).await.status, StatusCode::OK);

    tokio::time::advance(std::time::Duration::from_secs(61)).await;
    assert_eq!(app.status(&job_id).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_stores_blob_and_queues_job() {
    let app = TestApp::new().await;

    let response = app
        .send(multipart_request(
            "bracket.stl",
            helpers::TETRAHEDRON_STL.as_bytes(),
            &[("material", "ABS"), ("infill", "40"), ("rush", "true")],
        ))
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED, "{:?}", response.body);
    let job_id = response.body["job_id"].as_str().unwrap();
    assert_eq!(app.status(job_id).await.body["status"], "queued");
    assert_eq!(app.queue_len().await, 1);
    assert_eq!(std::fs::read_dir(app.blob_dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_upload_without_infill_stores_nothing() {
    let app = TestApp::new().await;

    let response = app
        .send(multipart_request(
            "bracket.stl",
            helpers::TETRAHEDRON_STL.as_bytes(),
            &[("material", "PLA")],
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.queue_len().await, 0);
    assert_eq!(std::fs::read_dir(app.blob_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_storage_failure_is_bad_gateway() {
    let app = TestApp::with_blobs(Arc::new(DownBlobs)).await;

    let response = app
        .send(multipart_request(
            "bracket.stl",
            helpers::TETRAHEDRON_STL.as_bytes(),
            &[("infill", "15")],
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "STORAGE_ERROR");
    assert_eq!(app.queue_len().await, 0);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_health_reports_backends() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["service"], "quotation-engine");
}

#[tokio::test]
async fn test_root_banner() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/", None).await;
    assert_eq!(response.status, StatusCode::OK);
}
