//! Integration tests for the Stripe webhook endpoint.
//!
//! Signature verification and the acknowledgment policy are exercised end to
//! end through the router. The database pool is lazy: tests only use events
//! whose handling is a no-op (or whose failed mutation must still ack), so no
//! PostgreSQL is needed.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use tower::ServiceExt;

/// Matches `Config::test_default()`.
const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Produce a valid `Stripe-Signature` header for `payload`, signed now.
fn sign(payload: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

async fn deliver(app: axum::Router, signature: Option<&str>, payload: &str) -> (StatusCode, String) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/webhooks/stripe")
        .header("Content-Type", "application/json");

    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }

    let response = app
        .oneshot(builder.body(Body::from(payload.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).to_string())
}

#[tokio::test]
async fn missing_signature_is_400() {
    let payload = json!({"type": "checkout.session.completed"}).to_string();
    let (status, body) = deliver(common::offline_app(), None, &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Webhook Error:"), "body was: {body}");
}

#[tokio::test]
async fn invalid_signature_is_400_and_writes_nothing() {
    // A valid-looking but wrong signature. The lazy pool would error loudly
    // if the handler reached the store; a 400 proves it never did.
    let payload = json!({
        "type": "checkout.session.completed",
        "data": { "object": { "metadata": { "user_id": "not-reached" } } }
    })
    .to_string();

    let header = format!("t={},v1={}", Utc::now().timestamp(), "ab".repeat(32));
    let (status, body) = deliver(common::offline_app(), Some(&header), &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Signature mismatch"), "body was: {body}");
}

#[tokio::test]
async fn tampered_payload_is_400() {
    let signed = json!({"type": "invoice.payment_succeeded"}).to_string();
    let delivered = json!({"type": "checkout.session.completed"}).to_string();

    let (status, _) = deliver(common::offline_app(), Some(&sign(&signed)), &delivered).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unrecognized_event_kind_is_acknowledged() {
    let payload = json!({
        "type": "customer.subscription.deleted",
        "data": { "object": {} }
    })
    .to_string();

    let (status, body) = deliver(common::offline_app(), Some(&sign(&payload)), &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook received");
}

#[tokio::test]
async fn renewal_without_customer_is_acknowledged() {
    // invoice.payment_succeeded with no customer reference: no profile can be
    // resolved, the reconciler no-ops, the delivery is still acked
    let payload = json!({
        "type": "invoice.payment_succeeded",
        "data": { "object": {} }
    })
    .to_string();

    let (status, body) = deliver(common::offline_app(), Some(&sign(&payload)), &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook received");
}

#[tokio::test]
async fn checkout_without_user_metadata_is_acknowledged() {
    let payload = json!({
        "type": "checkout.session.completed",
        "data": { "object": { "customer": "cus_123" } }
    })
    .to_string();

    let (status, body) = deliver(common::offline_app(), Some(&sign(&payload)), &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook received");
}

#[tokio::test]
async fn failed_mutation_still_acknowledges() {
    // A resolvable renewal event forces a store write, which fails against
    // the unreachable test database. The delivery must still come back 200.
    let payload = json!({
        "type": "invoice.payment_succeeded",
        "data": { "object": { "customer": "cus_unreachable" } }
    })
    .to_string();

    let (status, body) = deliver(common::offline_app(), Some(&sign(&payload)), &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook received");
}

#[tokio::test]
async fn non_json_payload_with_valid_signature_is_acknowledged() {
    let payload = "not an event";
    let (status, body) = deliver(common::offline_app(), Some(&sign(payload)), payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook received");
}
