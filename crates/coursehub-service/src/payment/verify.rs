//! Payment verification and settlement.
//!
//! The gateway's answer is authoritative. A transaction leaves PENDING at
//! most once; the access effects of a SUCCESS are idempotent and re-run on
//! every verification so a crash between settlement and fan-out heals on
//! the next call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_database::store::{FanoutReport, LedgerStore};
use coursehub_entity::group::GroupPurchase;
use coursehub_entity::ledger::{Transaction, TransactionStatus};
use coursehub_payment::PaymentGateway;
use coursehub_payment::dto::{RemoteStatus, Verification};
use coursehub_payment::money::{from_minor_units, to_minor_units};
use coursehub_payment::reference::is_valid_reference;

use crate::group::GroupPurchaseCoordinator;

/// Outcome of verifying a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    /// Gateway reference.
    pub reference: String,
    /// Ledger status after verification.
    pub status: TransactionStatus,
    /// Whether this call moved the transaction out of PENDING.
    pub settled_now: bool,
    /// Amount due, major units.
    pub amount: Decimal,
    /// The group this payment opened, for group checkouts.
    pub group: Option<GroupPurchase>,
    /// Enrollments granted, for single checkouts.
    pub fanout: Option<FanoutReport>,
}

/// Settles transactions against the gateway and grants access on success.
#[derive(Clone)]
pub struct PaymentService {
    ledger: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
    coordinator: GroupPurchaseCoordinator,
}

impl std::fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentService")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl PaymentService {
    /// Creates a new payment service.
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        coordinator: GroupPurchaseCoordinator,
    ) -> Self {
        Self {
            ledger,
            gateway,
            coordinator,
        }
    }

    /// Verify the payment behind `reference` and apply its effects.
    ///
    /// Settled transactions are not re-verified remotely. A SUCCESS opens the
    /// paid group or enrolls the buyer in every purchased course.
    pub async fn verify_payment(&self, reference: &str) -> AppResult<PaymentVerification> {
        let reference = reference.trim();
        if !is_valid_reference(reference) {
            return Err(AppError::not_found(format!("Transaction '{reference}' not found")));
        }
        let transaction = self
            .ledger
            .find_transaction_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Transaction '{reference}' not found")))?;

        let (transaction, settled_now) = if transaction.status.is_terminal() {
            (transaction, false)
        } else {
            let verification = self.gateway.verify(reference).await.map_err(|e| {
                warn!(reference = %reference, error = %e, "Payment verification failed");
                AppError::from(e)
            })?;
            match settlement(&transaction, &verification)? {
                Some((status, paid_at)) => {
                    let transition = self.ledger.settle(reference, status, paid_at).await?;
                    let applied = transition.applied();
                    let settled = transition.into_inner();
                    if applied {
                        info!(
                            user_id = %settled.user_id,
                            reference = %reference,
                            status = %settled.status,
                            amount = %settled.amount,
                            "Transaction settled"
                        );
                    }
                    (settled, applied)
                }
                None => (transaction, false),
            }
        };

        let mut outcome = PaymentVerification {
            reference: transaction.reference.clone(),
            status: transaction.status,
            settled_now,
            amount: transaction.amount,
            group: None,
            fanout: None,
        };
        if transaction.status != TransactionStatus::Success {
            return Ok(outcome);
        }

        if transaction.is_group_checkout() {
            let group = self.coordinator.activate(&transaction.reference).await?;
            outcome.group = Some(group.into_inner());
        } else {
            let report = self.ledger.grant_checkout_access(transaction.id).await?;
            if report.enrollments_created > 0 || report.promoted > 0 {
                info!(
                    user_id = %transaction.user_id,
                    reference = %transaction.reference,
                    enrollments_created = report.enrollments_created,
                    promoted = report.promoted,
                    "Course access granted"
                );
            }
            outcome.fanout = Some(report);
        }
        Ok(outcome)
    }
}

/// Map the gateway's answer to a terminal status, or `None` to stay PENDING.
fn settlement(
    transaction: &Transaction,
    verification: &Verification,
) -> AppResult<Option<(TransactionStatus, Option<DateTime<Utc>>)>> {
    match verification.status {
        RemoteStatus::Success => {
            let expected = to_minor_units(transaction.amount)?;
            if verification.amount < expected {
                warn!(
                    reference = %transaction.reference,
                    expected = %transaction.amount,
                    paid = %from_minor_units(verification.amount),
                    "Gateway reports an underpayment; transaction left pending"
                );
                return Ok(None);
            }
            if !verification.currency.is_empty()
                && !verification.currency.eq_ignore_ascii_case(&transaction.currency)
            {
                warn!(
                    reference = %transaction.reference,
                    expected = %transaction.currency,
                    paid = %verification.currency,
                    "Gateway reports a different currency; transaction left pending"
                );
                return Ok(None);
            }
            let paid_at = verification
                .paid_at
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map_or_else(Utc::now, |at| at.with_timezone(&Utc));
            Ok(Some((TransactionStatus::Success, Some(paid_at))))
        }
        status if status.is_failure() => Ok(Some((TransactionStatus::Failed, None))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::config::{CommerceConfig, PaymentConfig};
    use coursehub_core::error::ErrorKind;
    use coursehub_core::types::{CourseId, GroupTierId};
    use coursehub_database::MemoryCommerceStore;
    use coursehub_entity::course::Course;
    use coursehub_entity::group::{GroupStatus, GroupTier};
    use coursehub_entity::user::{User, UserRole};
    use coursehub_payment::ScriptedGateway;
    use rust_decimal_macros::dec;

    use crate::checkout::ledger_rows;
    use crate::context::RequestContext;
    use crate::payment::PaymentSessions;
    use crate::pricing::PricingEngine;

    struct Fixture {
        store: MemoryCommerceStore,
        gateway: Arc<ScriptedGateway>,
        service: PaymentService,
        coordinator: GroupPurchaseCoordinator,
        buyer: User,
        course: Course,
    }

    async fn fixture() -> Fixture {
        let store = MemoryCommerceStore::new();
        let tutor = User::new("tutor@example.com", UserRole::Tutor);
        let buyer = User::new("buyer@example.com", UserRole::User);
        let course = Course {
            id: CourseId::new(),
            tutor_id: tutor.id,
            category_id: None,
            title: "Treasury Ops".to_string(),
            base_price: Some(dec!(50000)),
            current_price: Some(dec!(35000)),
            price: None,
            created_at: Utc::now(),
        };
        store.seed_user(tutor).await;
        store.seed_user(buyer.clone()).await;
        store.seed_course(course.clone()).await;

        let backend = Arc::new(store.clone());
        let gateway = Arc::new(ScriptedGateway::new());
        let coordinator = GroupPurchaseCoordinator::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            PricingEngine::new(dec!(0.20)),
            PaymentSessions::new(gateway.clone(), PaymentConfig::default()),
            CommerceConfig::default(),
        );
        let service = PaymentService::new(backend, gateway.clone(), coordinator.clone());

        Fixture {
            store,
            gateway,
            service,
            coordinator,
            buyer,
            course,
        }
    }

    async fn pending_checkout(f: &Fixture) -> Transaction {
        let totals = PricingEngine::new(dec!(0.20))
            .compute_checkout_totals(std::slice::from_ref(&f.course), None, dec!(0.075))
            .unwrap();
        let (transaction, items) = ledger_rows(
            f.buyer.id,
            coursehub_payment::new_reference(),
            "NGN",
            &totals,
            None,
            None,
        );
        f.store.record_checkout(&transaction, &items).await.unwrap();
        transaction
    }

    #[tokio::test]
    async fn test_success_settles_once_and_enrolls() {
        let f = fixture().await;
        let transaction = pending_checkout(&f).await;
        f.gateway
            .script(&transaction.reference, RemoteStatus::Success, 3_762_500);

        let first = f.service.verify_payment(&transaction.reference).await.unwrap();
        assert_eq!(first.status, TransactionStatus::Success);
        assert!(first.settled_now);
        let fanout = first.fanout.unwrap();
        assert_eq!(fanout.enrollments_created, 1);
        assert_eq!(fanout.promoted, 1);
        assert!(f.store.has_student_profile(f.buyer.id).await);

        let second = f.service.verify_payment(&transaction.reference).await.unwrap();
        assert!(!second.settled_now);
        assert_eq!(second.fanout.unwrap().enrollments_created, 0);
        assert_eq!(f.gateway.verify_calls(), 1);
        assert_eq!(f.store.enrollments().await.len(), 1);

        let succeeded = f
            .store
            .events()
            .await
            .into_iter()
            .filter(|e| e.event_type == "checkout.succeeded")
            .count();
        assert_eq!(succeeded, 1);
    }

    #[tokio::test]
    async fn test_underpayment_and_pending_stay_pending() {
        let f = fixture().await;
        let transaction = pending_checkout(&f).await;

        let pending = f.service.verify_payment(&transaction.reference).await.unwrap();
        assert_eq!(pending.status, TransactionStatus::Pending);

        f.gateway
            .script(&transaction.reference, RemoteStatus::Success, 3_000_000);
        let short = f.service.verify_payment(&transaction.reference).await.unwrap();
        assert_eq!(short.status, TransactionStatus::Pending);
        assert!(short.fanout.is_none());
        assert!(f.store.enrollments().await.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_payment_fails() {
        let f = fixture().await;
        let transaction = pending_checkout(&f).await;
        f.gateway
            .script(&transaction.reference, RemoteStatus::Abandoned, 0);

        let outcome = f.service.verify_payment(&transaction.reference).await.unwrap();
        assert_eq!(outcome.status, TransactionStatus::Failed);
        assert!(outcome.settled_now);

        f.gateway
            .script(&transaction.reference, RemoteStatus::Success, 3_762_500);
        let later = f.service.verify_payment(&transaction.reference).await.unwrap();
        assert_eq!(later.status, TransactionStatus::Failed);
        assert!(f.store.enrollments().await.is_empty());
    }

    #[tokio::test]
    async fn test_group_payment_activates_group() {
        let f = fixture().await;
        let tier = GroupTier {
            id: GroupTierId::new(),
            course_id: f.course.id,
            size: 3,
            group_price: dec!(10000),
            cashback_percent: dec!(0.1),
            is_active: true,
            created_at: Utc::now(),
        };
        f.store.seed_tier(tier.clone()).await;
        let ctx = RequestContext::new(f.buyer.id, f.buyer.email.clone());
        let checkout = f
            .coordinator
            .create_group(&ctx, f.course.id, tier.id)
            .await
            .unwrap();
        assert!(f.gateway.pay_in_full(&checkout.reference));

        let outcome = f.service.verify_payment(&checkout.reference).await.unwrap();
        assert_eq!(outcome.status, TransactionStatus::Success);
        let group = outcome.group.unwrap();
        assert_eq!(group.status, GroupStatus::Active);
        assert!(outcome.fanout.is_none());
        assert!(f.store.enrollments().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_reference() {
        let f = fixture().await;
        let err = f
            .service
            .verify_payment(&coursehub_payment::new_reference())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(f.gateway.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reference_never_reaches_gateway() {
        let f = fixture().await;
        for reference in ["ps_missing", "CH-NOPE", "", "ps_0123456789ABCDEF0123456789ABCDEF"] {
            let err = f.service.verify_payment(reference).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotFound);
        }
        assert_eq!(f.gateway.verify_calls(), 0);
    }
}
