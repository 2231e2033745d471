//! Review boundary validation and error mapping.

use axum::http::StatusCode;
use review_store::ReviewStore;

use integration_tests::fixtures;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn create_review_returns_created_with_job_id() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .server
        .post("/products/P1/reviews")
        .json(&fixtures::review_body_with_content(5, "great"))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);

    let body: serde_json::Value = resp.json();
    assert_eq!(body["productId"].as_str(), Some("P1"));
    assert_eq!(body["rating"].as_u64(), Some(5));
    assert_eq!(body["content"].as_str(), Some("great"));
    assert!(body["jobId"].is_string());

    // The review is persisted regardless of pipeline progress.
    let review_id = body["id"].as_str().unwrap();
    assert!(ctx.store.get_review(review_id).await.unwrap().is_some());

    ctx.shutdown().await;
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let ctx = TestContext::new().await;

    for rating in [0, 6] {
        let resp = ctx
            .server
            .post("/products/P1/reviews")
            .json(&fixtures::review_body(rating))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = resp.json();
        assert_eq!(body["code"].as_str(), Some("VALIDATION"));
    }

    // Nothing reached the queue.
    assert_eq!(ctx.queue.stats().ready, 0);
    assert_eq!(ctx.queue.completed_jobs().len(), 0);

    ctx.shutdown().await;
}

#[tokio::test]
async fn update_unknown_review_returns_not_found() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .server
        .put("/products/P1/reviews/no-such-review")
        .json(&fixtures::review_body(4))
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);

    ctx.shutdown().await;
}

#[tokio::test]
async fn review_of_another_product_is_not_addressable() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .server
        .post("/products/P1/reviews")
        .json(&fixtures::review_body(4))
        .await;
    let review_id = resp.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = ctx
        .server
        .delete(&format!("/products/P2/reviews/{review_id}"))
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);

    // The review survives the misaddressed delete.
    assert!(ctx.store.get_review(&review_id).await.unwrap().is_some());

    ctx.shutdown().await;
}

#[tokio::test]
async fn rating_for_unknown_product_returns_not_found() {
    let ctx = TestContext::new().await;

    let resp = ctx.server.get("/products/nope/rating").await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["code"].as_str(), Some("NOT_FOUND"));

    ctx.shutdown().await;
}

#[tokio::test]
async fn publish_after_close_surfaces_unavailable() {
    let ctx = TestContext::new().await;
    ctx.queue.close();

    let resp = ctx
        .server
        .post("/products/P1/reviews")
        .json(&fixtures::review_body(4))
        .await;
    assert_eq!(resp.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    ctx.shutdown().await;
}
