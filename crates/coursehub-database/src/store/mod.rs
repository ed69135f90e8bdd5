//! Store traits the commerce services depend on.
//!
//! Every method that changes money, membership or enrollment state runs as
//! one atomic unit and writes its outbox events inside that unit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursehub_core::result::AppResult;
use coursehub_core::types::{
    CourseId, EventId, GroupPurchaseId, GroupTierId, PromoCodeId, TransactionId, UserId,
};
use coursehub_entity::course::Course;
use coursehub_entity::group::{GroupMember, GroupPurchase, GroupTier, JoinOutcome};
use coursehub_entity::ledger::{LineItem, Transaction, TransactionStatus};
use coursehub_entity::outbox::CommerceEventRecord;
use coursehub_entity::promo::PromoCode;
use coursehub_entity::user::User;

/// Outcome of a conditional state change.
#[derive(Debug, Clone)]
pub enum Transition<T> {
    /// The change was applied; carries the updated row.
    Applied(T),
    /// The row was already past the source state; carries it unchanged.
    Unchanged(T),
}

impl<T> Transition<T> {
    /// Whether the change was applied by this call.
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The row, changed or not.
    pub fn into_inner(self) -> T {
        match self {
            Self::Applied(row) | Self::Unchanged(row) => row,
        }
    }
}

/// Outcome of inserting a new group checkout.
#[derive(Debug, Clone)]
pub enum GroupInsert {
    /// Group, creator seat, transaction and events were committed.
    Created(GroupPurchase),
    /// The invite code is already used; nothing was written.
    InviteCodeTaken,
}

/// Outcome of a join attempt that passed every check.
#[derive(Debug, Clone)]
pub struct JoinResult {
    /// The group after the join.
    pub group: GroupPurchase,
    /// Whether a seat was taken (and whether it completed the group).
    pub outcome: JoinOutcome,
}

/// What an enrollment fan-out changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutReport {
    /// Users covered by the fan-out.
    pub members: usize,
    /// Enrollment rows inserted (existing rows are left in place).
    pub enrollments_created: usize,
    /// Users promoted from USER to STUDENT.
    pub promoted: usize,
}

/// Read access to users, courses, tiers and enrollments.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Find a user by ID.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a course by ID.
    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>>;

    /// Find the listed courses. Unknown IDs are omitted.
    async fn find_courses(&self, ids: &[CourseId]) -> AppResult<Vec<Course>>;

    /// Find a group tier by ID.
    async fn find_tier(&self, id: GroupTierId) -> AppResult<Option<GroupTier>>;

    /// The subset of `course_ids` the user is already enrolled in.
    async fn enrolled_course_ids(
        &self,
        user_id: UserId,
        course_ids: &[CourseId],
    ) -> AppResult<Vec<CourseId>>;
}

/// Promo lookup and usage counting.
#[async_trait]
pub trait PromoStore: Send + Sync + 'static {
    /// Find a promo by its upper-case code.
    async fn find_promo_by_code(&self, code: &str) -> AppResult<Option<PromoCode>>;

    /// Count SUCCESS transactions carrying the promo.
    async fn count_promo_uses(&self, promo_id: PromoCodeId) -> AppResult<i64>;

    /// Count SUCCESS transactions carrying the promo for one user.
    async fn count_promo_uses_by_user(
        &self,
        promo_id: PromoCodeId,
        user_id: UserId,
    ) -> AppResult<i64>;
}

/// Transaction and line-item persistence.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Persist a PENDING transaction with its line items and creation event.
    async fn record_checkout(&self, transaction: &Transaction, items: &[LineItem])
    -> AppResult<()>;

    /// Find a transaction by gateway reference.
    async fn find_transaction_by_reference(&self, reference: &str)
    -> AppResult<Option<Transaction>>;

    /// Line items of a transaction.
    async fn line_items(&self, transaction_id: TransactionId) -> AppResult<Vec<LineItem>>;

    /// Move a PENDING transaction to `status`, recording the settlement event.
    /// Already settled transactions are returned unchanged.
    async fn settle(
        &self,
        reference: &str,
        status: TransactionStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<Transition<Transaction>>;

    /// Upsert enrollments for every course of a SUCCESS transaction and
    /// promote the buyer if their role is USER.
    async fn grant_checkout_access(&self, transaction_id: TransactionId)
    -> AppResult<FanoutReport>;
}

/// Group-purchase persistence.
#[async_trait]
pub trait GroupStore: Send + Sync + 'static {
    /// The creator's PENDING_PAYMENT or ACTIVE group for a course.
    async fn find_open_group(
        &self,
        creator_id: UserId,
        course_id: CourseId,
    ) -> AppResult<Option<GroupPurchase>>;

    /// Insert the group, the creator's seat, the transaction with its line
    /// items and the creation events as one unit.
    async fn create_group_checkout(
        &self,
        group: &GroupPurchase,
        creator: &GroupMember,
        transaction: &Transaction,
        items: &[LineItem],
    ) -> AppResult<GroupInsert>;

    /// Find a group by invite code, case-insensitively.
    async fn find_group_by_invite_code(&self, invite_code: &str)
    -> AppResult<Option<GroupPurchase>>;

    /// Members of a group, creator first.
    async fn group_members(&self, id: GroupPurchaseId) -> AppResult<Vec<GroupMember>>;

    /// Move PENDING_PAYMENT to ACTIVE.
    async fn activate_group(&self, id: GroupPurchaseId) -> AppResult<Transition<GroupPurchase>>;

    /// Take a seat under a lock on the group row. On completion the creator's
    /// wallet is credited and the tutor's debited in the same unit.
    async fn join_group(&self, invite_code: &str, user_id: UserId) -> AppResult<JoinResult>;

    /// Upsert group-tagged enrollments for every member and promote USER
    /// members to STUDENT. Refuses groups that are not COMPLETED.
    async fn complete_fanout(&self, id: GroupPurchaseId) -> AppResult<FanoutReport>;
}

/// Outbox access for the relay.
#[async_trait]
pub trait OutboxStore: Send + Sync + 'static {
    /// Undispatched events with fewer than `max_attempts` attempts, oldest first.
    async fn pending_events(
        &self,
        limit: i64,
        max_attempts: i32,
    ) -> AppResult<Vec<CommerceEventRecord>>;

    /// Record a successful dispatch.
    async fn mark_dispatched(&self, id: EventId) -> AppResult<()>;

    /// Record a failed dispatch attempt.
    async fn mark_failed(&self, id: EventId, error: &str) -> AppResult<()>;
}

/// One backend viewed through each store trait.
#[derive(Clone)]
pub struct Stores {
    /// Users, courses, tiers, enrollments.
    pub catalog: Arc<dyn CatalogStore>,
    /// Promo codes.
    pub promo: Arc<dyn PromoStore>,
    /// Transactions.
    pub ledger: Arc<dyn LedgerStore>,
    /// Group purchases.
    pub group: Arc<dyn GroupStore>,
    /// Outbox.
    pub outbox: Arc<dyn OutboxStore>,
}

impl Stores {
    /// View one backend through every trait.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: CatalogStore + PromoStore + LedgerStore + GroupStore + OutboxStore,
    {
        Self {
            catalog: backend.clone(),
            promo: backend.clone(),
            ledger: backend.clone(),
            group: backend.clone(),
            outbox: backend,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
