//! Pure group-purchase transitions.
//!
//! Stores lock the group, gather the facts (`already_member`,
//! `already_enrolled`), call [`GroupPurchase::plan_join`] and persist the
//! resulting [`JoinPlan`] in the same atomic unit. Keeping the rules here
//! means the PostgreSQL and in-memory stores cannot drift apart.

use chrono::{DateTime, Utc};
use coursehub_core::events::{DomainEvent, GroupEvent};
use coursehub_core::types::{round_money, UserId};
use coursehub_core::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::purchase::{GroupPurchase, GroupStatus};
use super::tier::GroupTier;

/// Cashback economics fixed when the group is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashbackTerms {
    /// `round(group_price * cashback_percent)`.
    pub total: Decimal,
    /// `round(total / (size - 1))`, zero for a degenerate size.
    pub per_member: Decimal,
}

impl CashbackTerms {
    /// Compute the terms for a tier.
    pub fn for_tier(tier: &GroupTier) -> Self {
        let total = round_money(tier.group_price * tier.cashback_percent).max(Decimal::ZERO);
        let others = tier.size - 1;
        let per_member = if others > 0 {
            round_money(total / Decimal::from(others))
        } else {
            Decimal::ZERO
        };
        Self { total, per_member }
    }
}

/// What a join will write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPlan {
    /// Member count after the join.
    pub next_count: i32,
    /// Cashback accrued after the join.
    pub cashback_earned: Decimal,
    /// Whether this join fills the last seat.
    pub completes: bool,
    /// Completion timestamp, present only when `completes`.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of planning a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The user already holds a seat; nothing changes.
    AlreadyMember,
    /// A new seat will be taken.
    Join(JoinPlan),
}

impl GroupPurchase {
    /// Decide whether `user` may join and what the join writes.
    ///
    /// Checked in order: existing membership (idempotent no-op), status,
    /// capacity, existing enrollment. A completed group is reported as full.
    pub fn plan_join(
        &self,
        user_id: UserId,
        already_member: bool,
        already_enrolled: bool,
        now: DateTime<Utc>,
    ) -> AppResult<JoinOutcome> {
        if already_member || user_id == self.creator_id {
            return Ok(JoinOutcome::AlreadyMember);
        }
        match self.status {
            GroupStatus::PendingPayment => {
                return Err(AppError::validation(
                    "Group is not open yet; the creator's payment is pending",
                ));
            }
            GroupStatus::Completed => {
                return Err(AppError::conflict("Group is already complete"));
            }
            GroupStatus::Active => {}
        }
        if self.member_count >= self.member_limit {
            return Err(AppError::conflict("Group is full"));
        }
        if already_enrolled {
            return Err(AppError::validation("You are already enrolled in this course"));
        }

        let next_count = self.member_count + 1;
        let accrued = self.cashback_per_member * Decimal::from((next_count - 1).max(0));
        let cashback_earned = accrued.min(self.cashback_total);
        let completes = next_count >= self.member_limit;

        Ok(JoinOutcome::Join(JoinPlan {
            next_count,
            cashback_earned,
            completes,
            completed_at: completes.then_some(now),
        }))
    }

    /// Apply a plan produced by [`plan_join`](Self::plan_join).
    ///
    /// Status, `completed_at` and `cashback_released` change together.
    pub fn apply_join(&mut self, plan: &JoinPlan) {
        self.member_count = plan.next_count;
        self.cashback_earned = plan.cashback_earned;
        if plan.completes {
            self.status = GroupStatus::Completed;
            self.completed_at = plan.completed_at;
            self.cashback_released = true;
        }
        self.updated_at = plan.completed_at.unwrap_or_else(Utc::now);
    }

    /// Move `PENDING_PAYMENT` to `ACTIVE`. Returns `false` when the group was
    /// already past that state.
    pub fn activate(&mut self) -> bool {
        if self.status != GroupStatus::PendingPayment {
            return false;
        }
        self.status = GroupStatus::Active;
        self.updated_at = Utc::now();
        true
    }

    /// Outbox event recorded with the new group.
    pub fn created_event(&self) -> DomainEvent {
        DomainEvent::new(
            Some(self.creator_id),
            GroupEvent::Created {
                group_id: self.id,
                course_id: self.course_id,
                creator_id: self.creator_id,
                invite_code: self.invite_code.clone(),
            }
            .into(),
        )
    }

    /// Outbox event recorded when the creator's payment clears.
    pub fn activation_event(&self) -> DomainEvent {
        DomainEvent::new(
            Some(self.creator_id),
            GroupEvent::Activated {
                group_id: self.id,
                creator_id: self.creator_id,
            }
            .into(),
        )
    }

    /// Outbox events for a join already applied to `self`.
    pub fn join_events(&self, user_id: UserId, plan: &JoinPlan) -> Vec<DomainEvent> {
        let mut events = vec![DomainEvent::new(
            Some(user_id),
            GroupEvent::MemberJoined {
                group_id: self.id,
                user_id,
                member_count: plan.next_count,
                member_limit: self.member_limit,
            }
            .into(),
        )];
        if plan.completes {
            events.push(DomainEvent::new(
                Some(user_id),
                GroupEvent::Completed {
                    group_id: self.id,
                    creator_id: self.creator_id,
                    cashback_total: self.cashback_total,
                }
                .into(),
            ));
        }
        events
    }

    /// Whether completion wallet movements apply.
    pub fn releases_cashback(plan: &JoinPlan, cashback_total: Decimal) -> bool {
        plan.completes && cashback_total > Decimal::ZERO
    }
}
