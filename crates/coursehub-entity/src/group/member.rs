//! Group membership model.

use chrono::{DateTime, Utc};
use coursehub_core::types::{GroupMemberId, GroupPurchaseId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role of a user within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "group_member_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    /// Opened and paid for the group.
    Creator,
    /// Joined through the invite code.
    Member,
}

/// One user's seat in a group. Unique per (group, user).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupMember {
    /// Unique identifier.
    pub id: GroupMemberId,
    /// The group.
    pub group_purchase_id: GroupPurchaseId,
    /// The member.
    pub user_id: UserId,
    /// Creator or member.
    pub role: MemberRole,
    /// When the seat was taken.
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    /// Create a membership row stamped now.
    pub fn new(group_purchase_id: GroupPurchaseId, user_id: UserId, role: MemberRole) -> Self {
        Self {
            id: GroupMemberId::new(),
            group_purchase_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}
