//! Integration tests for single checkout, promo preview and payment verification.

mod helpers;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use coursehub_database::store::CatalogStore;
use coursehub_entity::ledger::TransactionStatus;
use coursehub_entity::user::UserRole;
use helpers::{TestApp, decimal};

#[tokio::test]
async fn test_health_reports_in_memory_store() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "in-memory");
}

#[tokio::test]
async fn test_checkout_requires_identity() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({ "course_ids": [] })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let app = TestApp::new();
    let buyer = app.create_user("buyer@example.com", UserRole::User).await;

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({ "course_ids": [] })),
            Some(&buyer),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(app.store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_checkout_with_promo_then_verify_grants_access_once() {
    let app = TestApp::new();
    let tutor = app.create_user("tutor@example.com", UserRole::Tutor).await;
    let buyer = app.create_user("buyer@example.com", UserRole::User).await;
    let rust = app.create_course(&tutor, "Rust Basics", dec!(20000)).await;
    let sql = app.create_course(&tutor, "SQL Basics", dec!(15000)).await;
    app.create_percent_promo("launch10", dec!(10)).await;

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({
                "course_ids": [rust.id, sql.id],
                "promo_code": "LAUNCH10",
            })),
            Some(&buyer),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let receipt = response.data();
    let reference = receipt["reference"].as_str().unwrap().to_string();
    // (20000 + 15000) * 0.9 * 1.075
    assert_eq!(decimal(&receipt["totals"]["total_amount"]), dec!(33862.5));
    assert_eq!(decimal(&receipt["totals"]["discount_amount"]), dec!(3500));
    assert!(
        receipt["authorization_url"]
            .as_str()
            .unwrap()
            .ends_with(&reference)
    );
    assert_eq!(app.gateway.sessions()[0].amount_minor, 3_386_250);

    let pending = app.store.transactions().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, TransactionStatus::Pending);

    let uri = format!("/api/payments/verify/{reference}");
    let unpaid = app.request("GET", &uri, None, None).await;
    assert_eq!(unpaid.status, StatusCode::OK);
    assert_eq!(unpaid.data()["status"], "PENDING");
    assert!(app.store.enrollments().await.is_empty());

    assert!(app.gateway.pay_in_full(&reference));
    let paid = app.request("GET", &uri, None, None).await;
    assert_eq!(paid.status, StatusCode::OK);
    assert_eq!(paid.data()["status"], "SUCCESS");
    assert_eq!(paid.data()["settled_now"], true);
    assert_eq!(paid.data()["fanout"]["enrollments_created"], 2);

    let again = app.request("GET", &uri, None, None).await;
    assert_eq!(again.data()["status"], "SUCCESS");
    assert_eq!(again.data()["settled_now"], false);
    assert_eq!(app.store.enrollments().await.len(), 2);

    let buyer = app.store.find_user(buyer.id).await.unwrap().unwrap();
    assert_eq!(buyer.role, UserRole::Student);
    assert!(app.store.has_student_profile(buyer.id).await);
}

#[tokio::test]
async fn test_verify_unknown_reference_is_not_found() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/api/payments/verify/CH-NOPE", None, None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_gateway_rejection_leaves_transaction_pending() {
    let app = TestApp::new();
    let tutor = app.create_user("tutor@example.com", UserRole::Tutor).await;
    let buyer = app.create_user("buyer@example.com", UserRole::User).await;
    let course = app.create_course(&tutor, "Go Basics", dec!(5000)).await;
    app.gateway.fail_initialize(true);

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({ "course_ids": [course.id] })),
            Some(&buyer),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let transactions = app.store.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, TransactionStatus::Pending);
}

#[tokio::test]
async fn test_promo_preview_reports_valid_and_unknown_codes() {
    let app = TestApp::new();
    let tutor = app.create_user("tutor@example.com", UserRole::Tutor).await;
    let buyer = app.create_user("buyer@example.com", UserRole::User).await;
    let course = app.create_course(&tutor, "Design", dec!(10000)).await;
    app.create_percent_promo("SAVE20", dec!(20)).await;

    let valid = app
        .request(
            "POST",
            "/api/promo/validate",
            Some(json!({ "code": "save20", "course_ids": [course.id] })),
            Some(&buyer),
        )
        .await;
    assert_eq!(valid.status, StatusCode::OK);
    assert_eq!(valid.data()["valid"], true);
    assert_eq!(decimal(&valid.data()["totals"]["discount_amount"]), dec!(2000));
    assert_eq!(decimal(&valid.data()["totals"]["total_amount"]), dec!(8600));

    let unknown = app
        .request(
            "POST",
            "/api/promo/validate",
            Some(json!({ "code": "NOPE", "course_ids": [course.id] })),
            Some(&buyer),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.data()["valid"], false);
    assert_eq!(unknown.data()["reason"], "NOT_FOUND");
    assert_eq!(decimal(&unknown.data()["totals"]["total_amount"]), dec!(10750));

    assert!(app.store.transactions().await.is_empty());
}
