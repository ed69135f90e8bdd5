//! Enrollment entity model.

use chrono::{DateTime, Utc};
use coursehub_core::types::{CourseId, EnrollmentId, GroupPurchaseId, TransactionId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// The user has access to the course.
    Active,
}

/// Access grant for one user on one course. Unique per (user, course).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    /// Unique identifier.
    pub id: EnrollmentId,
    /// The enrolled user.
    pub user_id: UserId,
    /// The course.
    pub course_id: CourseId,
    /// Status.
    pub status: EnrollmentStatus,
    /// Set when granted by a completed group purchase.
    pub group_purchase_id: Option<GroupPurchaseId>,
    /// Set when granted by a direct checkout.
    pub transaction_id: Option<TransactionId>,
    /// When the enrollment was created.
    pub created_at: DateTime<Utc>,
}
