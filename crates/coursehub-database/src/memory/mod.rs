//! In-memory implementation of the commerce stores.
//!
//! All state sits behind one `RwLock`; every mutation holds the write guard
//! for its whole duration, which gives the same all-or-nothing and
//! serialized-join guarantees as the PostgreSQL store. Used by tests and
//! local demos.

mod catalog;
mod group;
mod ledger;
mod outbox;
mod promo;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use coursehub_core::error::AppError;
use coursehub_core::events::DomainEvent;
use coursehub_core::result::AppResult;
use coursehub_core::types::{
    CourseId, EnrollmentId, GroupPurchaseId, GroupTierId, PromoCodeId, TransactionId, UserId,
};
use coursehub_entity::course::Course;
use coursehub_entity::enrollment::{Enrollment, EnrollmentStatus};
use coursehub_entity::group::{GroupMember, GroupPurchase, GroupTier};
use coursehub_entity::ledger::{LineItem, Transaction};
use coursehub_entity::outbox::CommerceEventRecord;
use coursehub_entity::promo::PromoCode;
use coursehub_entity::user::{Student, User, UserRole};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    students: HashMap<UserId, Student>,
    courses: HashMap<CourseId, Course>,
    tiers: HashMap<GroupTierId, GroupTier>,
    promos: HashMap<PromoCodeId, PromoCode>,
    transactions: HashMap<TransactionId, Transaction>,
    line_items: Vec<LineItem>,
    groups: HashMap<GroupPurchaseId, GroupPurchase>,
    members: Vec<GroupMember>,
    enrollments: Vec<Enrollment>,
    events: Vec<CommerceEventRecord>,
}

impl MemoryState {
    fn transaction_by_reference(&self, reference: &str) -> Option<&Transaction> {
        self.transactions.values().find(|t| t.reference == reference)
    }

    fn group_by_invite_code(&self, invite_code: &str) -> Option<GroupPurchaseId> {
        let wanted = invite_code.trim().to_uppercase();
        self.groups
            .values()
            .find(|g| g.invite_code == wanted)
            .map(|g| g.id)
    }

    fn is_member(&self, group_id: GroupPurchaseId, user_id: UserId) -> bool {
        self.members
            .iter()
            .any(|m| m.group_purchase_id == group_id && m.user_id == user_id)
    }

    fn is_enrolled(&self, user_id: UserId, course_id: CourseId) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id)
    }

    /// Checks everything `insert_transaction` needs before any write.
    fn check_transaction(&self, transaction: &Transaction) -> AppResult<()> {
        if self.transaction_by_reference(&transaction.reference).is_some() {
            return Err(AppError::conflict(format!(
                "Reference '{}' already recorded",
                transaction.reference
            )));
        }
        Ok(())
    }

    fn insert_transaction(&mut self, transaction: &Transaction, items: &[LineItem]) {
        self.transactions.insert(transaction.id, transaction.clone());
        self.line_items.extend(items.iter().cloned());
    }

    fn push_events(&mut self, records: Vec<CommerceEventRecord>) {
        self.events.extend(records);
    }

    /// Upsert ACTIVE enrollments; returns the number of new rows.
    fn upsert_enrollments(
        &mut self,
        pairs: &[(UserId, CourseId)],
        group_purchase_id: Option<GroupPurchaseId>,
        transaction_id: Option<TransactionId>,
    ) -> usize {
        let mut created = 0;
        for &(user_id, course_id) in pairs {
            match self
                .enrollments
                .iter_mut()
                .find(|e| e.user_id == user_id && e.course_id == course_id)
            {
                Some(existing) => {
                    existing.status = EnrollmentStatus::Active;
                    existing.group_purchase_id = existing.group_purchase_id.or(group_purchase_id);
                    existing.transaction_id = existing.transaction_id.or(transaction_id);
                }
                None => {
                    self.enrollments.push(Enrollment {
                        id: EnrollmentId::new(),
                        user_id,
                        course_id,
                        status: EnrollmentStatus::Active,
                        group_purchase_id,
                        transaction_id,
                        created_at: Utc::now(),
                    });
                    created += 1;
                }
            }
        }
        created
    }

    /// Promote USER rows to STUDENT and create their student profiles.
    fn promote_to_students(&mut self, user_ids: &[UserId]) -> usize {
        let mut promoted = 0;
        for user_id in user_ids {
            let Some(user) = self.users.get_mut(user_id) else {
                continue;
            };
            if !user.role.promotes_to_student() {
                continue;
            }
            user.role = UserRole::Student;
            user.updated_at = Utc::now();
            self.students.entry(*user_id).or_insert_with(|| Student {
                user_id: *user_id,
                created_at: Utc::now(),
            });
            promoted += 1;
        }
        promoted
    }
}

fn records(events: &[DomainEvent]) -> AppResult<Vec<CommerceEventRecord>> {
    events.iter().map(CommerceEventRecord::from_event).collect()
}

/// Commerce store held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryCommerceStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCommerceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub async fn seed_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Insert or replace a course.
    pub async fn seed_course(&self, course: Course) {
        self.state.write().await.courses.insert(course.id, course);
    }

    /// Insert or replace a group tier.
    pub async fn seed_tier(&self, tier: GroupTier) {
        self.state.write().await.tiers.insert(tier.id, tier);
    }

    /// Insert or replace a promo code; the code is normalized to upper case.
    pub async fn seed_promo(&self, mut promo: PromoCode) {
        promo.code = PromoCode::normalize_code(&promo.code);
        self.state.write().await.promos.insert(promo.id, promo);
    }

    /// Insert a transaction as-is, e.g. a past SUCCESS carrying a promo.
    pub async fn seed_transaction(&self, transaction: Transaction) {
        self.state
            .write()
            .await
            .transactions
            .insert(transaction.id, transaction);
    }

    /// Enroll a user directly.
    pub async fn seed_enrollment(&self, user_id: UserId, course_id: CourseId) {
        self.state
            .write()
            .await
            .upsert_enrollments(&[(user_id, course_id)], None, None);
    }

    /// All enrollments.
    pub async fn enrollments(&self) -> Vec<Enrollment> {
        self.state.read().await.enrollments.clone()
    }

    /// Whether a student profile exists for the user.
    pub async fn has_student_profile(&self, user_id: UserId) -> bool {
        self.state.read().await.students.contains_key(&user_id)
    }

    /// Every outbox row, oldest first.
    pub async fn events(&self) -> Vec<CommerceEventRecord> {
        self.state.read().await.events.clone()
    }

    /// Every recorded transaction.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.values().cloned().collect()
    }
}
