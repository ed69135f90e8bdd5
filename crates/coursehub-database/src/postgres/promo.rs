//! Promo lookup and usage counts.

use async_trait::async_trait;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{PromoCodeId, UserId};
use coursehub_entity::promo::PromoCode;

use super::PgCommerceStore;
use crate::store::PromoStore;

#[async_trait]
impl PromoStore for PgCommerceStore {
    async fn find_promo_by_code(&self, code: &str) -> AppResult<Option<PromoCode>> {
        sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes WHERE code = UPPER($1)")
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find promo code", e))
    }

    async fn count_promo_uses(&self, promo_id: PromoCodeId) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE promo_code_id = $1 AND status = 'SUCCESS'",
        )
        .bind(promo_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count promo uses", e))
    }

    async fn count_promo_uses_by_user(
        &self,
        promo_id: PromoCodeId,
        user_id: UserId,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions \
             WHERE promo_code_id = $1 AND user_id = $2 AND status = 'SUCCESS'",
        )
        .bind(promo_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count promo uses for user", e)
        })
    }
}
