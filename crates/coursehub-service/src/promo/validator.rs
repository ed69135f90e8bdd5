//! Promo validator service.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, UserId};
use coursehub_database::store::{CatalogStore, PromoStore};
use coursehub_entity::course::Course;
use coursehub_entity::promo::PromoCode;

/// Why a promo code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromoRejection {
    /// No promo with this code.
    NotFound,
    /// Switched off or outside its validity window.
    Inactive,
    /// Global redemption cap reached.
    Exhausted,
    /// The user already used it as often as allowed.
    UserLimitReached,
    /// None of the requested courses is covered.
    NotApplicable,
    /// Order value below the promo's minimum.
    BelowMinimum,
}

impl PromoRejection {
    /// Short message safe to show to the buyer.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "Promo code not found",
            Self::Inactive => "Promo code is not active",
            Self::Exhausted => "Promo code has reached its usage limit",
            Self::UserLimitReached => "You have already used this promo code",
            Self::NotApplicable => "Promo code does not apply to the selected courses",
            Self::BelowMinimum => "Order does not meet the promo code's minimum amount",
        }
    }
}

/// Result of validating a promo code.
#[derive(Debug, Clone)]
pub enum PromoDecision {
    /// The promo may be applied.
    Valid(PromoCode),
    /// The promo must not be applied.
    Rejected(PromoRejection),
}

/// Checks promo codes against their window, usage caps, scope and minimum.
#[derive(Clone)]
pub struct PromoValidator {
    promos: Arc<dyn PromoStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl std::fmt::Debug for PromoValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromoValidator").finish_non_exhaustive()
    }
}

impl PromoValidator {
    /// Creates a new promo validator.
    pub fn new(promos: Arc<dyn PromoStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { promos, catalog }
    }

    /// Validate `code` for `user_id` buying `course_ids`.
    ///
    /// Unknown course IDs are ignored here; checkout rejects them separately.
    pub async fn validate_promo_code(
        &self,
        code: &str,
        user_id: UserId,
        course_ids: &[CourseId],
    ) -> AppResult<PromoDecision> {
        let courses = self.catalog.find_courses(course_ids).await?;
        self.validate_for_courses(code, user_id, &courses).await
    }

    /// Validate `code` against courses that are already loaded.
    pub async fn validate_for_courses(
        &self,
        code: &str,
        user_id: UserId,
        courses: &[Course],
    ) -> AppResult<PromoDecision> {
        let code = PromoCode::normalize_code(code);
        let Some(promo) = self.promos.find_promo_by_code(&code).await? else {
            return Ok(reject(&code, PromoRejection::NotFound));
        };

        if !promo.is_live(Utc::now()) {
            return Ok(reject(&code, PromoRejection::Inactive));
        }

        if let Some(max_uses) = promo.max_uses {
            let used = self.promos.count_promo_uses(promo.id).await?;
            if used >= i64::from(max_uses) {
                return Ok(reject(&code, PromoRejection::Exhausted));
            }
        }

        if let Some(per_user) = promo.max_uses_per_user {
            let used = self
                .promos
                .count_promo_uses_by_user(promo.id, user_id)
                .await?;
            if used >= i64::from(per_user) {
                return Ok(reject(&code, PromoRejection::UserLimitReached));
            }
        }

        if !courses.iter().any(|course| promo.applies_to(course)) {
            return Ok(reject(&code, PromoRejection::NotApplicable));
        }

        if let Some(minimum) = promo.min_order_amount {
            let order_value: Decimal = courses.iter().map(Course::effective_price).sum();
            if order_value < minimum {
                return Ok(reject(&code, PromoRejection::BelowMinimum));
            }
        }

        Ok(PromoDecision::Valid(promo))
    }
}

fn reject(code: &str, reason: PromoRejection) -> PromoDecision {
    debug!(code = %code, reason = ?reason, "Promo code rejected");
    PromoDecision::Rejected(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use coursehub_core::types::{PromoCodeId, TransactionId};
    use coursehub_database::MemoryCommerceStore;
    use coursehub_entity::ledger::{Transaction, TransactionStatus};
    use coursehub_entity::promo::{DiscountType, PromoScope};
    use rust_decimal_macros::dec;

    fn course(price: Decimal) -> Course {
        Course {
            id: CourseId::new(),
            tutor_id: UserId::new(),
            category_id: None,
            title: "Bookkeeping 101".to_string(),
            base_price: Some(price),
            current_price: None,
            price: None,
            created_at: Utc::now(),
        }
    }

    fn promo(code: &str) -> PromoCode {
        PromoCode {
            id: PromoCodeId::new(),
            code: code.to_string(),
            discount_type: DiscountType::Percent,
            discount_value: dec!(10),
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
        }
    }

    fn redeemed(promo: &PromoCode, user_id: UserId) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            user_id,
            reference: coursehub_payment::new_reference(),
            status: TransactionStatus::Success,
            amount: dec!(1075),
            subtotal_amount: dec!(1000),
            discount_amount: dec!(0),
            vat_amount: dec!(75),
            tutor_share_amount: dec!(800),
            platform_share_amount: dec!(200),
            currency: "NGN".to_string(),
            promo_code_id: Some(promo.id),
            group_purchase_id: None,
            paid_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup(p: PromoCode, c: &Course) -> (MemoryCommerceStore, PromoValidator) {
        let store = MemoryCommerceStore::new();
        store.seed_course(c.clone()).await;
        store.seed_promo(p).await;
        let backend = Arc::new(store.clone());
        (store, PromoValidator::new(backend.clone(), backend))
    }

    fn rejection(decision: PromoDecision) -> Option<PromoRejection> {
        match decision {
            PromoDecision::Valid(_) => None,
            PromoDecision::Rejected(reason) => Some(reason),
        }
    }

    #[tokio::test]
    async fn test_valid_code_is_case_insensitive() {
        let c = course(dec!(5000));
        let (_, validator) = setup(promo("LAUNCH10"), &c).await;
        let decision = validator
            .validate_promo_code(" launch10 ", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert!(matches!(decision, PromoDecision::Valid(p) if p.code == "LAUNCH10"));
    }

    #[tokio::test]
    async fn test_unknown_and_expired_codes() {
        let c = course(dec!(5000));
        let mut expired = promo("OLD");
        expired.ends_at = Some(Utc::now() - Duration::days(1));
        let (_, validator) = setup(expired, &c).await;

        let decision = validator
            .validate_promo_code("NOPE", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert_eq!(rejection(decision), Some(PromoRejection::NotFound));

        let decision = validator
            .validate_promo_code("old", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert_eq!(rejection(decision), Some(PromoRejection::Inactive));
    }

    #[tokio::test]
    async fn test_usage_caps() {
        let c = course(dec!(5000));
        let mut p = promo("ONCE");
        p.max_uses = Some(2);
        p.max_uses_per_user = Some(1);
        let repeat_buyer = UserId::new();
        let (store, validator) = setup(p.clone(), &c).await;

        store.seed_transaction(redeemed(&p, repeat_buyer)).await;
        let decision = validator
            .validate_promo_code("ONCE", repeat_buyer, &[c.id])
            .await
            .unwrap();
        assert_eq!(rejection(decision), Some(PromoRejection::UserLimitReached));

        let decision = validator
            .validate_promo_code("ONCE", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert!(rejection(decision).is_none());

        store.seed_transaction(redeemed(&p, UserId::new())).await;
        let decision = validator
            .validate_promo_code("ONCE", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert_eq!(rejection(decision), Some(PromoRejection::Exhausted));
    }

    #[tokio::test]
    async fn test_pending_transactions_do_not_count_as_uses() {
        let c = course(dec!(5000));
        let mut p = promo("FIRST");
        p.max_uses = Some(1);
        let (store, validator) = setup(p.clone(), &c).await;

        let mut pending = redeemed(&p, UserId::new());
        pending.status = TransactionStatus::Pending;
        store.seed_transaction(pending).await;

        let decision = validator
            .validate_promo_code("FIRST", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert!(rejection(decision).is_none());
    }

    #[tokio::test]
    async fn test_scope_and_minimum() {
        let c = course(dec!(5000));
        let mut scoped = promo("ELSEWHERE");
        scoped.scope = PromoScope::Course;
        scoped.course_ids = vec![CourseId::new()];
        let (store, validator) = setup(scoped, &c).await;

        let decision = validator
            .validate_promo_code("ELSEWHERE", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert_eq!(rejection(decision), Some(PromoRejection::NotApplicable));

        let mut big_spender = promo("BIG");
        big_spender.min_order_amount = Some(dec!(8000));
        store.seed_promo(big_spender).await;
        let decision = validator
            .validate_promo_code("BIG", UserId::new(), &[c.id])
            .await
            .unwrap();
        assert_eq!(rejection(decision), Some(PromoRejection::BelowMinimum));
    }
}
