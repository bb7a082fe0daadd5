mod common;

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chinmudra::http::build_router;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use common::test_service;

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    // Extractor rejections come back as plain text.
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    Ok((status, body))
}

async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    send(app, Request::builder().uri(uri).body(Body::empty())?).await
}

async fn post(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;
    send(app, request).await
}

#[tokio::test]
async fn root_greets() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let app = build_router(service);

    let (status, body) = get(&app, "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello, Chinmudra!"}));
    Ok(())
}

#[tokio::test]
async fn end_to_end_enrollment_and_payment() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let app = build_router(service);

    let (status, batch) = post(&app, "/batches", json!({"name": "A"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batch, json!({"id": 1, "name": "A", "total_students": 0}));

    let (status, student) = post(&app, "/students", json!({"name": "S1", "batch_id": 1})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(student["id"], 1);
    assert_eq!(student["name"], "S1");
    assert_eq!(student["batch_id"], 1);
    assert_eq!(student["payment_status"], "unpaid");
    assert_eq!(student["amount"], 0);
    assert!(student["last_payment_date"].is_null());

    let (status, batches) = get(&app, "/batches").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batches[0]["total_students"], 1);

    let (status, payment) = post(&app, "/payments", json!({"student_id": 1, "amount": 500})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["id"], 1);
    assert_eq!(payment["student_id"], 1);
    assert_eq!(payment["amount"], 500);
    assert!(payment["transaction_id"].is_null());
    assert!(payment["date"].is_string());

    let (status, payments) = get(&app, "/students/1/payments").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments, json!([payment.clone()]));

    let (status, students) = get(&app, "/batches/1/students").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students[0]["payment_status"], "paid");
    assert_eq!(students[0]["amount"], 500);
    assert_eq!(students[0]["last_payment_date"], payment["date"]);
    Ok(())
}

#[tokio::test]
async fn duplicate_batch_is_bad_request() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let app = build_router(service);

    post(&app, "/batches", json!({"name": "A"})).await?;
    let (status, body) = post(&app, "/batches", json!({"name": "A"})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Batch already exists"}));
    Ok(())
}

#[tokio::test]
async fn missing_parents_are_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let app = build_router(service);

    let (status, body) = post(&app, "/students", json!({"name": "S1", "batch_id": 9})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Batch not found"}));

    let (status, body) = post(&app, "/payments", json!({"student_id": 9, "amount": 10})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Student not found"}));

    let (status, body) = get(&app, "/students/9/payments").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Student not found"}));

    let (status, body) = get(&app, "/batches/9/students").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Batch not found"}));
    Ok(())
}

#[tokio::test]
async fn payment_carries_transaction_id() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let app = build_router(service);

    post(&app, "/batches", json!({"name": "A"})).await?;
    post(&app, "/students", json!({"name": "S1", "batch_id": 1})).await?;

    let (status, payment) = post(
        &app,
        "/payments",
        json!({"student_id": 1, "amount": 750, "transaction_id": "UPI-2024-001"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["transaction_id"], "UPI-2024-001");
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_rejected_before_the_service() -> Result<()> {
    let (service, temp) = test_service().await?;
    let app = build_router(service);

    let (status, _) = post(&app, "/batches", json!({"title": "A"})).await?;
    assert!(status.is_client_error());

    let (status, _) = post(&app, "/payments", json!({"student_id": 1, "amount": "lots"})).await?;
    assert!(status.is_client_error());

    assert_eq!(common::count_rows(&temp, "batches").await?, 0);
    Ok(())
}
