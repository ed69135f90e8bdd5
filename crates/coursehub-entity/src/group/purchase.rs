//! Group purchase entity model.

use chrono::{DateTime, Utc};
use coursehub_core::types::{CourseId, GroupPurchaseId, GroupTierId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::tier::GroupTier;
use super::transition::CashbackTerms;

/// Lifecycle of a group purchase: `PENDING_PAYMENT -> ACTIVE -> COMPLETED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "group_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    /// Waiting for the creator's payment.
    PendingPayment,
    /// Open for members.
    Active,
    /// Every seat taken, cashback released.
    Completed,
}

impl GroupStatus {
    /// Whether the group still blocks its creator from opening another one
    /// for the same course.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::PendingPayment | Self::Active)
    }

    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A collaborative purchase of one course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupPurchase {
    /// Unique identifier.
    pub id: GroupPurchaseId,
    /// The course being bought.
    pub course_id: CourseId,
    /// The tier the group was opened on.
    pub tier_id: GroupTierId,
    /// The user who opened and paid for the group.
    pub creator_id: UserId,
    /// `GRP-XXXXXXXX`, unique.
    pub invite_code: String,
    /// Lifecycle status.
    pub status: GroupStatus,
    /// Seats taken, creator included.
    pub member_count: i32,
    /// Seats available (the tier size).
    pub member_limit: i32,
    /// Price paid by the creator.
    pub group_price: Decimal,
    /// Cashback released to the creator on completion.
    pub cashback_total: Decimal,
    /// Cashback accrued per joining member.
    pub cashback_per_member: Decimal,
    /// Cashback accrued so far, never above `cashback_total`.
    pub cashback_earned: Decimal,
    /// Set together with the transition to `Completed`.
    pub cashback_released: bool,
    /// Set together with the transition to `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the group was opened.
    pub created_at: DateTime<Utc>,
    /// When the group was last updated.
    pub updated_at: DateTime<Utc>,
}

impl GroupPurchase {
    /// Open a group awaiting the creator's payment, with the creator's seat taken.
    pub fn open(tier: &GroupTier, creator_id: UserId, invite_code: String) -> Self {
        let terms = CashbackTerms::for_tier(tier);
        let now = Utc::now();
        Self {
            id: GroupPurchaseId::new(),
            course_id: tier.course_id,
            tier_id: tier.id,
            creator_id,
            invite_code,
            status: GroupStatus::PendingPayment,
            member_count: 1,
            member_limit: tier.size,
            group_price: tier.group_price,
            cashback_total: terms.total,
            cashback_per_member: terms.per_member,
            cashback_earned: Decimal::ZERO,
            cashback_released: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Seats still free.
    pub fn seats_left(&self) -> i32 {
        (self.member_limit - self.member_count).max(0)
    }
}
