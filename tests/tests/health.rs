//! Health, readiness, and operator endpoints.

use axum::http::StatusCode;
use pipeline_core::limits::{MAX_ATTEMPTS, PRIORITY_DEFAULT};
use pipeline_core::JobOptions;
use std::time::Duration;

use integration_tests::fixtures;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn health_reports_queue_stats() {
    let ctx = TestContext::new().await;

    let resp = ctx.server.get("/health").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"].as_str(), Some("ok"));
    assert_eq!(body["queue"]["ready"].as_u64(), Some(0));
    assert_eq!(body["queue"]["closed"].as_bool(), Some(false));

    ctx.shutdown().await;
}

#[tokio::test]
async fn liveness_is_unconditional() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.server.get("/health/live").await.status_code(), StatusCode::OK);

    ctx.queue.close();
    assert_eq!(ctx.server.get("/health/live").await.status_code(), StatusCode::OK);

    ctx.shutdown().await;
}

#[tokio::test]
async fn readiness_flips_when_queue_closes() {
    let ctx = TestContext::new().await;

    assert_eq!(
        ctx.server.get("/health/ready").await.status_code(),
        StatusCode::OK
    );

    ctx.queue.close();

    assert_eq!(
        ctx.server.get("/health/ready").await.status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    let body: serde_json::Value = ctx.server.get("/health").await.json();
    assert_eq!(body["status"].as_str(), Some("draining"));

    ctx.shutdown().await;
}

#[tokio::test]
async fn dead_letters_endpoint_lists_exhausted_jobs() {
    let ctx = TestContext::new().await;

    ctx.queue
        .enqueue(
            fixtures::unknown_kind_payload("P1"),
            PRIORITY_DEFAULT,
            JobOptions::default(),
        )
        .unwrap();

    // Real-time backoff: base delay, then doubled.
    for _ in 0..800 {
        if !ctx.queue.dead_letters().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let resp = ctx.server.get("/queue/dead-letters").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["count"].as_u64(), Some(1));
    assert_eq!(
        body["deadLetters"][0]["job"]["attemptCount"].as_u64(),
        Some(MAX_ATTEMPTS as u64)
    );

    ctx.shutdown().await;
}

#[tokio::test]
async fn metrics_endpoint_returns_snapshot() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/products/P1/reviews")
        .json(&fixtures::review_body(5))
        .await;
    ctx.wait_for_drain().await;

    let resp = ctx.server.get("/metrics").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let body: serde_json::Value = resp.json();
    assert!(body["eventsPublished"].as_u64().is_some());
    assert!(body["jobsProcessed"].as_u64().is_some());
    assert!(body["timestamp"].is_string());

    ctx.shutdown().await;
}
