//! Integration tests for POST /midtrans/notification

mod common;

use common::{build_app, post_json, send, signed_notification};
use axum::body::Body;
use http::{Request, StatusCode};
use qris_checkout::database::OrderStore;
use qris_checkout::payments::types::{PaymentFlow, TransactionStatus};
use serde_json::json;

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = build_app();
    let request = Request::builder()
        .method("POST")
        .uri("/midtrans/notification")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["received"], false);
}

#[tokio::test]
async fn missing_signature_is_bad_request() {
    let app = build_app();

    let (status, _) = send(
        &app.router,
        post_json(
            "/midtrans/notification",
            json!({"order_id": "ORDER-1", "status_code": "200", "gross_amount": "10000.00"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.gateway.status_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_signature_is_unauthorized_without_gateway_call() {
    let app = build_app();
    let mut payload = signed_notification("ORDER-1", "200", "10000.00");
    payload["gross_amount"] = json!("10001.00");

    let (status, body) = send(&app.router, post_json("/midtrans/notification", payload)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["received"], false);
    assert!(app.gateway.status_queries.lock().unwrap().is_empty());
    assert!(!app.store.exists("ORDER-1").await.unwrap());
}

#[tokio::test]
async fn unknown_order_gets_placeholder_record() {
    let app = build_app();
    app.gateway.set_status(TransactionStatus::Settlement);

    let (status, body) = send(
        &app.router,
        post_json(
            "/midtrans/notification",
            signed_notification("ORDER-from-dashboard", "200", "75000.00"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);

    let order = app.store.get("ORDER-from-dashboard").await.unwrap().unwrap();
    assert_eq!(order.flow, PaymentFlow::Unknown);
    assert_eq!(order.status, TransactionStatus::Settlement);
    assert_eq!(order.gross_amount, 75000);
    assert!(order.payment_artifact.is_none());
}

#[tokio::test]
async fn numeric_status_code_is_signed_as_received() {
    let app = build_app();
    let mut payload = signed_notification("ORDER-2", "200", "10000.00");
    payload["status_code"] = json!(200);

    let (status, _) = send(&app.router, post_json("/midtrans/notification", payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.gateway.status_queries.lock().unwrap().as_slice(),
        ["ORDER-2".to_string()]
    );
}

#[tokio::test]
async fn gateway_outage_answers_500_so_midtrans_retries() {
    let app = build_app();
    app.gateway.go_offline();

    let (status, body) = send(
        &app.router,
        post_json(
            "/midtrans/notification",
            signed_notification("ORDER-3", "200", "10000.00"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["received"], false);
    assert!(!app.store.exists("ORDER-3").await.unwrap());
}
