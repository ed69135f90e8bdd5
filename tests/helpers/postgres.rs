//! Test application backed by a real PostgreSQL database.
//!
//! Set `COURSEHUB_TEST_DATABASE_URL` to run these tests; without it they
//! return early. Rows are keyed by fresh IDs so tests share one database
//! without cleaning it.

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use coursehub_api::{AppState, build_app};
use coursehub_core::config::{AppConfig, DatabaseConfig};
use coursehub_core::traits::LogNotificationDispatcher;
use coursehub_core::types::{CourseId, GroupTierId, PromoCodeId, UserId};
use coursehub_database::{DatabasePool, PgCommerceStore, Stores};
use coursehub_entity::course::Course;
use coursehub_entity::group::GroupTier;
use coursehub_entity::promo::{DiscountType, PromoScope};
use coursehub_entity::user::{User, UserRole};
use coursehub_payment::ScriptedGateway;
use coursehub_service::CommerceServices;

use super::{TestResponse, send};

/// Environment variable holding the test database URL.
pub const TEST_DATABASE_URL: &str = "COURSEHUB_TEST_DATABASE_URL";

/// Test application over `PgCommerceStore`.
pub struct PgTestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Store shared with the router
    pub store: PgCommerceStore,
    /// Gateway shared with the router
    pub gateway: Arc<ScriptedGateway>,
    /// Services behind the router
    pub services: CommerceServices,
}

impl PgTestApp {
    /// Connect and migrate, or `None` when no test database is configured.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var(TEST_DATABASE_URL) else {
            eprintln!("{TEST_DATABASE_URL} is not set; skipping PostgreSQL test");
            return None;
        };

        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url,
            max_connections: 16,
            min_connections: 1,
            run_migrations: true,
            ..DatabaseConfig::default()
        };

        let database = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        let db_pool = database.pool().clone();
        let store = PgCommerceStore::new(db_pool.clone());
        let gateway = Arc::new(ScriptedGateway::new());
        let services = CommerceServices::new(
            Stores::from_backend(Arc::new(store.clone())),
            gateway.clone(),
            Arc::new(LogNotificationDispatcher),
            &config,
        );
        let router = build_app(AppState::new(config, services.clone(), Some(database)));

        Some(Self {
            router,
            db_pool,
            store,
            gateway,
            services,
        })
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

    /// Insert a user whose email is unique to this run.
    pub async fn create_user(&self, label: &str, role: UserRole) -> User {
        let id = UserId::new();
        let mut user = User::new(format!("{label}-{id}@example.com"), role);
        user.id = id;
        sqlx::query(
            "INSERT INTO users (id, email, role, wallet_balance, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.wallet_balance)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db_pool)
        .await
        .expect("Failed to insert user");
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
        sqlx::query(
            "INSERT INTO courses (id, tutor_id, title, base_price, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(course.id)
        .bind(course.tutor_id)
        .bind(&course.title)
        .bind(course.base_price)
        .bind(course.created_at)
        .execute(&self.db_pool)
        .await
        .expect("Failed to insert course");
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
        sqlx::query(
            "INSERT INTO group_tiers (id, course_id, size, group_price, cashback_percent, \
             is_active, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(tier.id)
        .bind(tier.course_id)
        .bind(tier.size)
        .bind(tier.group_price)
        .bind(tier.cashback_percent)
        .bind(tier.is_active)
        .bind(tier.created_at)
        .execute(&self.db_pool)
        .await
        .expect("Failed to insert group tier");
        tier
    }

    /// Insert a site-wide percent promo usable once per user; returns its code.
    pub async fn create_once_per_user_promo(&self, prefix: &str, percent: Decimal) -> String {
        let id = PromoCodeId::new();
        let code = format!("{prefix}{}", &id.to_string()[..8]).to_uppercase();
        sqlx::query(
            "INSERT INTO promo_codes (id, code, discount_type, discount_value, scope, \
             max_uses_per_user, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, 1, TRUE, NOW())",
        )
        .bind(id)
        .bind(&code)
        .bind(DiscountType::Percent)
        .bind(percent)
        .bind(PromoScope::All)
        .execute(&self.db_pool)
        .await
        .expect("Failed to insert promo code");
        code
    }

    /// Enrollment rows for `course_id`.
    pub async fn enrollment_count(&self, course_id: CourseId) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count enrollments")
    }
}
