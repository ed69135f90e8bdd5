//! Shared test helpers for integration tests.

#![allow(dead_code)]

pub mod postgres;

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use coursehub_api::{AppState, build_app};
use coursehub_api::extractors::auth::{USER_EMAIL_HEADER, USER_ID_HEADER};
use coursehub_core::config::AppConfig;
use coursehub_core::traits::LogNotificationDispatcher;
use coursehub_core::types::{CourseId, GroupTierId, PromoCodeId};
use coursehub_database::{MemoryCommerceStore, Stores};
use coursehub_entity::course::Course;
use coursehub_entity::group::GroupTier;
use coursehub_entity::promo::{DiscountType, PromoCode, PromoScope};
use coursehub_entity::user::{User, UserRole};
use coursehub_payment::ScriptedGateway;
use coursehub_service::CommerceServices;

/// Test application backed by the in-memory store and a scripted gateway.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store shared with the router
    pub store: MemoryCommerceStore,
    /// Gateway shared with the router
    pub gateway: Arc<ScriptedGateway>,
    /// Services behind the router
    pub services: CommerceServices,
}

/// Response status plus parsed JSON body.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = MemoryCommerceStore::new();
        let gateway = Arc::new(ScriptedGateway::new());
        let services = CommerceServices::new(
            Stores::from_backend(Arc::new(store.clone())),
            gateway.clone(),
            Arc::new(LogNotificationDispatcher),
            &config,
        );
        let router = build_app(AppState::new(config, services.clone(), None));

        Self {
            router,
            store,
            gateway,
            services,
        }
    }

    /// Send a request, optionally as `user`.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        user: Option<&User>,
    ) -> TestResponse {
        send(&self.router, method, uri, body, user).await
    }

    pub async fn create_user(&self, email: &str, role: UserRole) -> User {
        let user = User::new(email, role);
        self.store.seed_user(user.clone()).await;
        user
    }

    pub async fn create_course(&self, tutor: &User, title: &str, price: Decimal) -> Course {
        let course = Course {
            id: CourseId::new(),
            tutor_id: tutor.id,
            category_id: None,
            title: title.to_string(),
            base_price: Some(price),
            current_price: None,
            price: None,
            created_at: Utc::now(),
        };
        self.store.seed_course(course.clone()).await;
        course
    }

    pub async fn create_tier(&self, course: &Course, size: i32, group_price: Decimal) -> GroupTier {
        let tier = GroupTier {
            id: GroupTierId::new(),
            course_id: course.id,
            size,
            group_price,
            cashback_percent: Decimal::new(1, 1),
            is_active: true,
            created_at: Utc::now(),
        };
        self.store.seed_tier(tier.clone()).await;
        tier
    }

    pub async fn create_percent_promo(&self, code: &str, percent: Decimal) -> PromoCode {
        let promo = PromoCode {
            id: PromoCodeId::new(),
            code: code.to_string(),
            discount_type: DiscountType::Percent,
            discount_value: percent,
            scope: PromoScope::All,
            course_ids: Vec::new(),
            category_ids: Vec::new(),
            max_uses: None,
            max_uses_per_user: None,
            min_order_amount: None,
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
        };
        self.store.seed_promo(promo.clone()).await;
        promo
    }
}

/// Send a request through `router`, optionally as `user`.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    user: Option<&User>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder
            .header(USER_ID_HEADER, user.id.to_string())
            .header(USER_EMAIL_HEADER, user.email.as_str());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse { status, body }
}

/// Parse a decimal rendered by the API (string or number).
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}
