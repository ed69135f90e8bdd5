use async_trait::async_trait;

use coursehub_core::result::AppResult;
use coursehub_core::types::{PromoCodeId, UserId};
use coursehub_entity::ledger::TransactionStatus;
use coursehub_entity::promo::PromoCode;

use super::MemoryCommerceStore;
use crate::store::PromoStore;

#[async_trait]
impl PromoStore for MemoryCommerceStore {
    async fn find_promo_by_code(&self, code: &str) -> AppResult<Option<PromoCode>> {
        let wanted = PromoCode::normalize_code(code);
        let state = self.state.read().await;
        Ok(state.promos.values().find(|p| p.code == wanted).cloned())
    }

    async fn count_promo_uses(&self, promo_id: PromoCodeId) -> AppResult<i64> {
        let state = self.state.read().await;
        let uses = state
            .transactions
            .values()
            .filter(|t| t.promo_code_id == Some(promo_id) && t.status == TransactionStatus::Success)
            .count();
        Ok(uses as i64)
    }

    async fn count_promo_uses_by_user(
        &self,
        promo_id: PromoCodeId,
        user_id: UserId,
    ) -> AppResult<i64> {
        let state = self.state.read().await;
        let uses = state
            .transactions
            .values()
            .filter(|t| {
                t.promo_code_id == Some(promo_id)
                    && t.user_id == user_id
                    && t.status == TransactionStatus::Success
            })
            .count();
        Ok(uses as i64)
    }
}
