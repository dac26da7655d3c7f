//! End-to-end HTTP tests for the payment session lifecycle, running the
//! full router against file-backed stores in a temp directory.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use mockpay_api::{create_router, AppConfig, AppState};
use mockpay_core::{CheckoutPolicy, ManualClock, PaymentSessions};
use mockpay_store::{FileOrderStore, FileSessionStore, JsonStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn test_server(clock: &ManualClock) -> (TestServer, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let sessions: FileSessionStore = JsonStore::open(dir.path().join("sessions")).unwrap();
    let orders: FileOrderStore = JsonStore::open(dir.path().join("orders")).unwrap();

    let gateway = PaymentSessions::new(
        Arc::new(sessions),
        Arc::new(orders),
        CheckoutPolicy::default(),
        Arc::new(clock.clone()),
    );

    let state = AppState {
        gateway: Arc::new(gateway),
        config: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: dir.path().to_path_buf(),
            environment: "test".to_string(),
        },
    };

    (TestServer::new(create_router(state)).unwrap(), dir)
}

fn bench_cart_body() -> Value {
    json!({
        "cart": [{"id": 1, "name": "Bench", "price": 60, "qty": 2}],
        "customer": {"email": "a@b.com", "name": "A"}
    })
}

async fn create_session(server: &TestServer, body: &Value) -> Value {
    let res = server
        .post("/api/create-mock-payment-session")
        .json(body)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    res.json::<Value>()
}

#[tokio::test]
async fn health_check() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server.get("/health").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.json::<Value>()["status"], "OK");
}

#[tokio::test]
async fn create_session_returns_pending_with_totals() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let session = create_session(&server, &bench_cart_body()).await;
    assert_eq!(session["status"], "pending");
    assert_eq!(session["currency"], "USD");
    // subtotal 120.00, free shipping, tax 9.60
    assert_eq!(session["amount"], json!(129.6));

    let res = server
        .get(&format!(
            "/api/payment-session/{}",
            session["sessionId"].as_str().unwrap()
        ))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let status = res.json::<Value>();
    assert_eq!(status["status"], "pending");
    assert_eq!(status["amount"], json!(129.6));
    assert!(status["expiresAt"].is_string());
}

#[tokio::test]
async fn small_cart_pays_flat_shipping() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let body = json!({
        "cart": [{"id": 2, "name": "Band", "price": 10, "qty": 1}],
        "customer": {"email": "a@b.com"}
    });
    let session = create_session(&server, &body).await;
    // subtotal 10.00 + shipping 9.99 + tax 0.80
    assert_eq!(session["amount"], json!(20.79));
}

#[tokio::test]
async fn empty_cart_rejected() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server
        .post("/api/create-mock-payment-session")
        .json(&json!({"cart": [], "customer": {"email": "a@b.com"}}))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["error"], "Invalid cart data");
    assert_eq!(body["detail"], "Cart must be a non-empty array");
}

#[tokio::test]
async fn missing_customer_email_rejected() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server
        .post("/api/create-mock-payment-session")
        .json(&json!({
            "cart": [{"id": 1, "name": "Bench", "price": 60, "qty": 2}],
            "customer": {"name": "No Email"}
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Invalid customer data");
}

#[tokio::test]
async fn absurdly_large_cart_rejected_not_wrapped() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    // schema-valid but beyond the representable cent range
    let res = server
        .post("/api/create-mock-payment-session")
        .json(&json!({
            "cart": [{"id": 1, "name": "Bench", "price": 50000000000000000.0, "qty": 1000}],
            "customer": {"email": "a@b.com"}
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["error"], "Invalid cart data");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("exceeds the supported amount"));
}

#[tokio::test]
async fn invalid_quantity_rejected() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server
        .post("/api/create-mock-payment-session")
        .json(&json!({
            "cart": [{"id": 1, "name": "Bench", "price": 60, "qty": 0}],
            "customer": {"email": "a@b.com"}
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Invalid cart data");
}

#[tokio::test]
async fn unknown_session_is_404() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server.get("/api/payment-session/nope").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_payment_full_flow() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let session = create_session(&server, &bench_cart_body()).await;
    let session_id = session["sessionId"].as_str().unwrap();

    let res = server
        .post("/api/complete-payment")
        .json(&json!({
            "sessionId": session_id,
            "paymentMethod": "mock_upi",
            "shippingAddress": {"line1": "1 Main St", "city": "Pune"},
            "notes": "leave at door"
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let completion = res.json::<Value>();
    assert_eq!(completion["status"], "completed");
    assert_eq!(completion["amount"], json!(129.6));
    assert_eq!(completion["message"], "Payment completed successfully");

    let order_id = completion["orderId"].as_str().unwrap();

    // the session now reports completed
    let status = server
        .get(&format!("/api/payment-session/{}", session_id))
        .await
        .json::<Value>();
    assert_eq!(status["status"], "completed");

    // the order snapshots the session
    let res = server.get(&format!("/api/order/{}", order_id)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let order = res.json::<Value>();
    assert_eq!(order["sessionId"], session_id);
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["paymentMethod"], "mock_upi");
    assert_eq!(order["cart"][0]["name"], "Bench");
    assert_eq!(order["totals"]["total"], json!(129.6));
    assert_eq!(order["shippingAddress"]["city"], "Pune");
    assert_eq!(order["notes"], "leave at door");
}

#[tokio::test]
async fn double_completion_rejected_with_single_order() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let session = create_session(&server, &bench_cart_body()).await;
    let session_id = session["sessionId"].as_str().unwrap();
    let body = json!({"sessionId": session_id});

    let first = server.post("/api/complete-payment").json(&body).await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = server.post("/api/complete-payment").json(&body).await;
    assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(second.json::<Value>()["error"], "Payment already completed");

    let orders = server.get("/api/admin/orders").await.json::<Value>();
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn expired_session_cannot_complete() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let session = create_session(&server, &bench_cart_body()).await;
    let session_id = session["sessionId"].as_str().unwrap();

    clock.advance(Duration::minutes(31));

    // the read flips the stored status
    let status = server
        .get(&format!("/api/payment-session/{}", session_id))
        .await
        .json::<Value>();
    assert_eq!(status["status"], "expired");

    let res = server
        .post("/api/complete-payment")
        .json(&json!({"sessionId": session_id}))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Payment session expired");

    // and no order was issued
    let orders = server.get("/api/admin/orders").await.json::<Value>();
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn complete_without_session_id_rejected() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server
        .post("/api/complete-payment")
        .json(&json!({"paymentMethod": "mock_card"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["detail"], "sessionId is required");
}

#[tokio::test]
async fn complete_unknown_session_is_404() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server
        .post("/api/complete-payment")
        .json(&json!({"sessionId": "nope"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn orders_by_email_filters() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let session = create_session(&server, &bench_cart_body()).await;
    server
        .post("/api/complete-payment")
        .json(&json!({"sessionId": session["sessionId"]}))
        .await;

    let res = server.get("/api/orders").add_query_param("email", "a@b.com").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.json::<Value>().as_array().unwrap().len(), 1);

    let res = server
        .get("/api/orders")
        .add_query_param("email", "other@b.com")
        .await;
    assert!(res.json::<Value>().as_array().unwrap().is_empty());

    let res = server.get("/api/orders").await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>()["detail"],
        "email query parameter is required"
    );
}

#[tokio::test]
async fn admin_updates_order_status() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let session = create_session(&server, &bench_cart_body()).await;
    let completion = server
        .post("/api/complete-payment")
        .json(&json!({"sessionId": session["sessionId"]}))
        .await
        .json::<Value>();
    let order_id = completion["orderId"].as_str().unwrap();

    let res = server
        .patch(&format!("/api/admin/order/{}/status", order_id))
        .json(&json!({"status": "shipped"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["message"], "Order status updated successfully");

    let order = server
        .get(&format!("/api/order/{}", order_id))
        .await
        .json::<Value>();
    assert_eq!(order["status"], "shipped");
    assert!(order["updatedAt"].is_string());

    // unknown status values are rejected
    let res = server
        .patch(&format!("/api/admin/order/{}/status", order_id))
        .json(&json!({"status": "teleported"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    // unknown order is 404
    let res = server
        .patch("/api/admin/order/nope/status")
        .json(&json!({"status": "shipped"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_order_is_404() {
    let clock = ManualClock::new(Utc::now());
    let (server, _dir) = test_server(&clock);

    let res = server.get("/api/order/nope").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>()["error"], "Order not found");
}
