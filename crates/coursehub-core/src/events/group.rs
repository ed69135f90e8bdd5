//! Group-purchase lifecycle events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CourseId, GroupPurchaseId, UserId};

/// Events emitted while a group purchase moves through its states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GroupEvent {
    /// The creator opened a group and is paying for it.
    Created {
        /// The group.
        group_id: GroupPurchaseId,
        /// The course being bought.
        course_id: CourseId,
        /// The creator.
        creator_id: UserId,
        /// Shareable invite code.
        invite_code: String,
    },
    /// The creator's payment cleared; members may join.
    Activated {
        /// The group.
        group_id: GroupPurchaseId,
        /// The creator.
        creator_id: UserId,
    },
    /// A member joined.
    MemberJoined {
        /// The group.
        group_id: GroupPurchaseId,
        /// The new member.
        user_id: UserId,
        /// Members after the join, creator included.
        member_count: i32,
        /// Capacity of the group.
        member_limit: i32,
    },
    /// The last slot was filled and cashback released.
    Completed {
        /// The group.
        group_id: GroupPurchaseId,
        /// The creator receiving the cashback.
        creator_id: UserId,
        /// Cashback credited to the creator.
        cashback_total: Decimal,
    },
}

impl GroupEvent {
    /// Short dotted event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "group.created",
            Self::Activated { .. } => "group.activated",
            Self::MemberJoined { .. } => "group.member_joined",
            Self::Completed { .. } => "group.completed",
        }
    }
}
