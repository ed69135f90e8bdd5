//! Group-purchase coordinator.
//!
//! Owns the `PENDING_PAYMENT -> ACTIVE -> COMPLETED` lifecycle. Every
//! state change goes through one atomic store call; the enrollment fan-out
//! runs in its own unit right after the join that completed the group.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use coursehub_core::config::CommerceConfig;
use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, GroupPurchaseId, GroupTierId, TransactionId};
use coursehub_database::store::{
    CatalogStore, FanoutReport, GroupInsert, GroupStore, LedgerStore, Transition,
};
use coursehub_entity::group::{GroupMember, GroupPurchase, JoinOutcome, MemberRole};
use coursehub_entity::ledger::TransactionStatus;
use coursehub_payment::new_reference;

use super::invite::generate_invite_code;
use crate::checkout::ledger_rows;
use crate::context::RequestContext;
use crate::payment::PaymentSessions;
use crate::pricing::{CheckoutTotals, PricingEngine};

type InviteCodeSource = Arc<dyn Fn() -> String + Send + Sync>;

/// Result of opening a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCheckout {
    /// The new group, awaiting payment.
    pub group: GroupPurchase,
    /// Shareable `/group/{inviteCode}` link.
    pub invite_link: String,
    /// The creator's transaction.
    pub transaction_id: TransactionId,
    /// Gateway reference for the creator's payment.
    pub reference: String,
    /// Hosted payment page.
    pub authorization_url: String,
    /// Priced breakdown of the group price.
    pub totals: CheckoutTotals,
}

/// What a join did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinStatus {
    /// A seat was taken; the group is still open.
    Joined,
    /// The caller already held a seat; nothing changed.
    AlreadyMember,
    /// The caller took the last seat.
    Completed,
}

/// Result of a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinReceipt {
    /// The group after the join.
    pub group: GroupPurchase,
    /// What happened.
    pub status: JoinStatus,
    /// Enrollment fan-out result when this join completed the group.
    /// `None` when the fan-out failed and must be re-run.
    pub fanout: Option<FanoutReport>,
}

/// Public view of a group behind an invite link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetails {
    /// The group.
    pub group: GroupPurchase,
    /// Members, creator first.
    pub members: Vec<GroupMember>,
    /// Free seats.
    pub seats_left: i32,
    /// Shareable link.
    pub invite_link: String,
}

/// Coordinates group creation, activation, joins and completion.
#[derive(Clone)]
pub struct GroupPurchaseCoordinator {
    catalog: Arc<dyn CatalogStore>,
    groups: Arc<dyn GroupStore>,
    ledger: Arc<dyn LedgerStore>,
    pricing: PricingEngine,
    sessions: PaymentSessions,
    commerce: CommerceConfig,
    invite_codes: InviteCodeSource,
}

impl std::fmt::Debug for GroupPurchaseCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupPurchaseCoordinator")
            .field("pricing", &self.pricing)
            .field("commerce", &self.commerce)
            .finish_non_exhaustive()
    }
}

impl GroupPurchaseCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        groups: Arc<dyn GroupStore>,
        ledger: Arc<dyn LedgerStore>,
        pricing: PricingEngine,
        sessions: PaymentSessions,
        commerce: CommerceConfig,
    ) -> Self {
        Self {
            catalog,
            groups,
            ledger,
            pricing,
            sessions,
            commerce,
            invite_codes: Arc::new(generate_invite_code),
        }
    }

    /// Replace the invite code source.
    pub fn with_invite_codes(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.invite_codes = Arc::new(source);
        self
    }

    /// Open a group on `tier_id` for `course_id`, paid by the caller.
    ///
    /// The group, the creator's seat, the priced transaction and the
    /// creation events are written as one unit. Invite-code collisions are
    /// retried up to `invite_code_attempts` times, then fail with `Conflict`.
    pub async fn create_group(
        &self,
        ctx: &RequestContext,
        course_id: CourseId,
        tier_id: GroupTierId,
    ) -> AppResult<GroupCheckout> {
        let course = self
            .catalog
            .find_course(course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course '{course_id}' not found")))?;
        let tier = self
            .catalog
            .find_tier(tier_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group tier '{tier_id}' not found")))?;
        tier.ensure_purchasable(course.id)?;

        if let Some(open) = self.groups.find_open_group(ctx.user_id, course.id).await? {
            return Err(AppError::validation(format!(
                "You already have an open group for this course ({})",
                open.invite_code
            )));
        }
        let owned = self
            .catalog
            .enrolled_course_ids(ctx.user_id, &[course.id])
            .await?;
        if !owned.is_empty() {
            return Err(AppError::validation("You are already enrolled in this course"));
        }

        let totals = self.pricing.compute_group_totals(
            course.id,
            tier.group_price,
            self.commerce.vat_rate,
        )?;

        let mut created = None;
        for attempt in 1..=self.commerce.invite_code_attempts {
            let group = GroupPurchase::open(&tier, ctx.user_id, (self.invite_codes)());
            let creator = GroupMember::new(group.id, ctx.user_id, MemberRole::Creator);
            let (transaction, items) = ledger_rows(
                ctx.user_id,
                new_reference(),
                self.sessions.currency(),
                &totals,
                None,
                Some(group.id),
            );

            match self
                .groups
                .create_group_checkout(&group, &creator, &transaction, &items)
                .await?
            {
                GroupInsert::Created(group) => {
                    created = Some((group, transaction));
                    break;
                }
                GroupInsert::InviteCodeTaken => {
                    warn!(
                        attempt,
                        invite_code = %group.invite_code,
                        "Invite code already taken; regenerating"
                    );
                }
            }
        }

        let Some((group, transaction)) = created else {
            return Err(AppError::conflict(
                "Could not allocate a unique invite code; please retry",
            ));
        };

        info!(
            user_id = %ctx.user_id,
            group_id = %group.id,
            invite_code = %group.invite_code,
            reference = %transaction.reference,
            member_limit = group.member_limit,
            "Group purchase created"
        );

        let session = self.sessions.open(ctx, &transaction).await?;

        Ok(GroupCheckout {
            invite_link: self.commerce.invite_link(&group.invite_code),
            group,
            transaction_id: transaction.id,
            reference: transaction.reference,
            authorization_url: session.authorization_url,
            totals,
        })
    }

    /// Open the group paid for by the SUCCESS transaction `reference`.
    ///
    /// Idempotent: an already active or completed group is returned unchanged.
    pub async fn activate(&self, reference: &str) -> AppResult<Transition<GroupPurchase>> {
        let transaction = self
            .ledger
            .find_transaction_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Transaction '{reference}' not found")))?;
        if transaction.status != TransactionStatus::Success {
            return Err(AppError::validation(
                "The creator's payment has not succeeded",
            ));
        }
        let group_id = transaction
            .group_purchase_id
            .ok_or_else(|| AppError::validation("Transaction did not pay for a group"))?;

        let transition = self.groups.activate_group(group_id).await?;
        if transition.applied() {
            info!(group_id = %group_id, reference = %reference, "Group purchase activated");
        }
        Ok(transition)
    }

    /// Take a seat in the group behind `invite_code`.
    ///
    /// Re-joining is a no-op. The join that fills the last seat also runs the
    /// enrollment fan-out; a fan-out failure is logged and the join still
    /// succeeds, leaving the fan-out to be re-run.
    pub async fn join_group(
        &self,
        ctx: &RequestContext,
        invite_code: &str,
    ) -> AppResult<JoinReceipt> {
        let result = self
            .groups
            .join_group(invite_code.trim(), ctx.user_id)
            .await?;
        let group = result.group;

        let plan = match result.outcome {
            JoinOutcome::AlreadyMember => {
                return Ok(JoinReceipt {
                    group,
                    status: JoinStatus::AlreadyMember,
                    fanout: None,
                });
            }
            JoinOutcome::Join(plan) => plan,
        };

        info!(
            user_id = %ctx.user_id,
            group_id = %group.id,
            member_count = group.member_count,
            member_limit = group.member_limit,
            "Member joined group"
        );

        if !plan.completes {
            return Ok(JoinReceipt {
                group,
                status: JoinStatus::Joined,
                fanout: None,
            });
        }

        info!(
            group_id = %group.id,
            cashback_total = %group.cashback_total,
            "Group purchase completed"
        );
        let fanout = match self.run_completion_fanout(group.id).await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(
                    group_id = %group.id,
                    error = %e,
                    "Completion fan-out failed; re-run it for this group"
                );
                None
            }
        };

        Ok(JoinReceipt {
            group,
            status: JoinStatus::Completed,
            fanout,
        })
    }

    /// Enroll every member of a COMPLETED group and promote USER members.
    ///
    /// Idempotent; safe to re-run after a failure.
    pub async fn run_completion_fanout(&self, group_id: GroupPurchaseId) -> AppResult<FanoutReport> {
        let report = self.groups.complete_fanout(group_id).await?;
        info!(
            group_id = %group_id,
            members = report.members,
            enrollments_created = report.enrollments_created,
            promoted = report.promoted,
            "Completion fan-out finished"
        );
        Ok(report)
    }

    /// Look up the group behind an invite link, case-insensitively.
    pub async fn find_by_invite_code(&self, invite_code: &str) -> AppResult<GroupDetails> {
        let code = invite_code.trim();
        let group = self
            .groups
            .find_group_by_invite_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group '{code}' not found")))?;
        let members = self.groups.group_members(group.id).await?;
        Ok(GroupDetails {
            seats_left: group.seats_left(),
            invite_link: self.commerce.invite_link(&group.invite_code),
            members,
            group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use coursehub_core::config::PaymentConfig;
    use coursehub_core::error::ErrorKind;
    use coursehub_core::types::UserId;
    use coursehub_database::MemoryCommerceStore;
    use coursehub_entity::course::Course;
    use coursehub_entity::group::{GroupStatus, GroupTier};
    use coursehub_entity::user::{User, UserRole};
    use coursehub_payment::ScriptedGateway;
    use rust_decimal_macros::dec;

    use crate::group::invite::is_valid_invite_code;

    struct Fixture {
        store: MemoryCommerceStore,
        gateway: Arc<ScriptedGateway>,
        coordinator: GroupPurchaseCoordinator,
        tutor: User,
        creator: RequestContext,
        course: Course,
        tier: GroupTier,
    }

    async fn fixture(size: i32) -> Fixture {
        let store = MemoryCommerceStore::new();
        let tutor = User::new("tutor@example.com", UserRole::Tutor);
        let creator = User::new("creator@example.com", UserRole::User);
        let course = Course {
            id: CourseId::new(),
            tutor_id: tutor.id,
            category_id: None,
            title: "Team Finance".to_string(),
            base_price: Some(dec!(3000)),
            current_price: None,
            price: None,
            created_at: Utc::now(),
        };
        let tier = GroupTier {
            id: GroupTierId::new(),
            course_id: course.id,
            size,
            group_price: dec!(10000),
            cashback_percent: dec!(0.1),
            is_active: true,
            created_at: Utc::now(),
        };
        store.seed_user(tutor.clone()).await;
        store.seed_user(creator.clone()).await;
        store.seed_course(course.clone()).await;
        store.seed_tier(tier.clone()).await;

        let backend = Arc::new(store.clone());
        let gateway = Arc::new(ScriptedGateway::new());
        let coordinator = GroupPurchaseCoordinator::new(
            backend.clone(),
            backend.clone(),
            backend,
            PricingEngine::new(dec!(0.20)),
            PaymentSessions::new(gateway.clone(), PaymentConfig::default()),
            CommerceConfig::default(),
        );

        Fixture {
            store,
            gateway,
            coordinator,
            tutor,
            creator: RequestContext::new(creator.id, creator.email),
            course,
            tier,
        }
    }

    async fn member(store: &MemoryCommerceStore, n: usize) -> RequestContext {
        let user = User::new(format!("member{n}@example.com"), UserRole::User);
        store.seed_user(user.clone()).await;
        RequestContext::new(user.id, user.email)
    }

    async fn settle(store: &MemoryCommerceStore, reference: &str) {
        use coursehub_database::store::LedgerStore;
        store
            .settle(reference, TransactionStatus::Success, Some(Utc::now()))
            .await
            .unwrap();
    }

    async fn paid_group(f: &Fixture) -> GroupPurchase {
        let checkout = f
            .coordinator
            .create_group(&f.creator, f.course.id, f.tier.id)
            .await
            .unwrap();
        settle(&f.store, &checkout.reference).await;
        f.coordinator
            .activate(&checkout.reference)
            .await
            .unwrap()
            .into_inner()
    }

    #[tokio::test]
    async fn test_create_group_records_pending_group_and_transaction() {
        let f = fixture(5).await;
        let checkout = f
            .coordinator
            .create_group(&f.creator, f.course.id, f.tier.id)
            .await
            .unwrap();

        assert!(is_valid_invite_code(&checkout.group.invite_code));
        assert_eq!(checkout.group.status, GroupStatus::PendingPayment);
        assert_eq!(checkout.group.member_count, 1);
        assert_eq!(checkout.group.cashback_total, dec!(1000));
        assert_eq!(checkout.group.cashback_per_member, dec!(250));
        assert!(checkout.invite_link.ends_with(&format!("/group/{}", checkout.group.invite_code)));
        assert_eq!(checkout.totals.total_amount, dec!(10750));
        assert_eq!(f.gateway.sessions()[0].amount_minor, 1_075_000);

        let transactions = f.store.transactions().await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].group_purchase_id, Some(checkout.group.id));

        let names: Vec<String> = f.store.events().await.into_iter().map(|e| e.event_type).collect();
        assert!(names.contains(&"group.created".to_string()));
        assert!(names.contains(&"checkout.created".to_string()));
    }

    #[tokio::test]
    async fn test_create_group_preconditions() {
        let f = fixture(5).await;

        let err = f
            .coordinator
            .create_group(&f.creator, CourseId::new(), f.tier.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = f
            .coordinator
            .create_group(&f.creator, f.course.id, GroupTierId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        f.coordinator
            .create_group(&f.creator, f.course.id, f.tier.id)
            .await
            .unwrap();
        let err = f
            .coordinator
            .create_group(&f.creator, f.course.id, f.tier.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let enrolled = member(&f.store, 1).await;
        f.store.seed_enrollment(enrolled.user_id, f.course.id).await;
        let err = f
            .coordinator
            .create_group(&enrolled, f.course.id, f.tier.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_invite_code_collision_is_retried_then_fails() {
        let f = fixture(5).await;
        let first = f
            .coordinator
            .clone()
            .with_invite_codes(|| "GRP-TAKEN001".to_string())
            .create_group(&f.creator, f.course.id, f.tier.id)
            .await
            .unwrap();
        assert_eq!(first.group.invite_code, "GRP-TAKEN001");

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let retrying = f.coordinator.clone().with_invite_codes(move || {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                "GRP-TAKEN001".to_string()
            } else {
                "GRP-FRESH002".to_string()
            }
        });
        let other = member(&f.store, 1).await;
        let second = retrying
            .create_group(&other, f.course.id, f.tier.id)
            .await
            .unwrap();
        assert_eq!(second.group.invite_code, "GRP-FRESH002");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let stuck = f
            .coordinator
            .clone()
            .with_invite_codes(|| "GRP-TAKEN001".to_string());
        let third = member(&f.store, 2).await;
        let err = stuck
            .create_group(&third, f.course.id, f.tier.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_activate_requires_successful_payment() {
        let f = fixture(3).await;
        let checkout = f
            .coordinator
            .create_group(&f.creator, f.course.id, f.tier.id)
            .await
            .unwrap();

        let err = f.coordinator.activate(&checkout.reference).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        settle(&f.store, &checkout.reference).await;
        let first = f.coordinator.activate(&checkout.reference).await.unwrap();
        assert!(first.applied());
        let again = f.coordinator.activate(&checkout.reference).await.unwrap();
        assert!(!again.applied());
        assert_eq!(again.into_inner().status, GroupStatus::Active);
    }

    #[tokio::test]
    async fn test_join_until_completion() {
        let f = fixture(5).await;
        let group = paid_group(&f).await;

        let mut receipts = Vec::new();
        for n in 0..4 {
            let ctx = member(&f.store, n).await;
            receipts.push(
                f.coordinator
                    .join_group(&ctx, &group.invite_code.to_lowercase())
                    .await
                    .unwrap(),
            );
        }

        let completed: Vec<_> = receipts
            .iter()
            .filter(|r| r.status == JoinStatus::Completed)
            .collect();
        assert_eq!(completed.len(), 1);
        let last = receipts.last().unwrap();
        assert_eq!(last.status, JoinStatus::Completed);
        assert_eq!(last.group.member_count, 5);
        assert_eq!(last.group.cashback_earned, dec!(1000));
        assert!(last.group.cashback_released);
        let fanout = last.fanout.unwrap();
        assert_eq!(fanout.members, 5);
        assert_eq!(fanout.enrollments_created, 5);

        let again = f
            .coordinator
            .run_completion_fanout(group.id)
            .await
            .unwrap();
        assert_eq!(again.enrollments_created, 0);
        assert_eq!(f.store.enrollments().await.len(), 5);

        let tutor = f.store_user(f.tutor.id).await;
        assert_eq!(tutor.role, UserRole::Tutor);
        assert_eq!(tutor.wallet_balance, dec!(-1000));

        let late = member(&f.store, 9).await;
        let err = f
            .coordinator
            .join_group(&late, &group.invite_code)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_rejoin_is_a_no_op() {
        let f = fixture(5).await;
        let group = paid_group(&f).await;
        let ctx = member(&f.store, 1).await;

        let first = f.coordinator.join_group(&ctx, &group.invite_code).await.unwrap();
        assert_eq!(first.status, JoinStatus::Joined);
        let second = f.coordinator.join_group(&ctx, &group.invite_code).await.unwrap();
        assert_eq!(second.status, JoinStatus::AlreadyMember);
        assert_eq!(second.group.member_count, 2);

        let creator = f.coordinator.join_group(&f.creator, &group.invite_code).await.unwrap();
        assert_eq!(creator.status, JoinStatus::AlreadyMember);
    }

    #[tokio::test]
    async fn test_find_by_invite_code() {
        let f = fixture(4).await;
        let group = paid_group(&f).await;

        let details = f
            .coordinator
            .find_by_invite_code(&group.invite_code.to_lowercase())
            .await
            .unwrap();
        assert_eq!(details.group.id, group.id);
        assert_eq!(details.members.len(), 1);
        assert_eq!(details.members[0].role, MemberRole::Creator);
        assert_eq!(details.seats_left, 3);

        let err = f
            .coordinator
            .find_by_invite_code("GRP-00000000")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    impl Fixture {
        async fn store_user(&self, id: UserId) -> User {
            use coursehub_database::store::CatalogStore;
            self.store.find_user(id).await.unwrap().unwrap()
        }
    }
}
