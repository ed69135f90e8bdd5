//! Group tier entity model.

use chrono::{DateTime, Utc};
use coursehub_core::types::{CourseId, GroupTierId};
use coursehub_core::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A size/price/cashback offer a tutor publishes for one course.
///
/// Tiers referenced by a purchase can be deactivated but not deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupTier {
    /// Unique identifier.
    pub id: GroupTierId,
    /// The course this tier sells.
    pub course_id: CourseId,
    /// Number of seats, creator included.
    pub size: i32,
    /// Total price the creator pays.
    pub group_price: Decimal,
    /// Cashback as a fraction of `group_price` (0.1 = 10%).
    pub cashback_percent: Decimal,
    /// Whether new groups may use this tier.
    pub is_active: bool,
    /// When the tier was created.
    pub created_at: DateTime<Utc>,
}

impl GroupTier {
    /// Check that a new group can be opened on this tier for `course_id`.
    pub fn ensure_purchasable(&self, course_id: CourseId) -> AppResult<()> {
        if self.course_id != course_id {
            return Err(AppError::validation("Tier does not belong to this course"));
        }
        if !self.is_active {
            return Err(AppError::validation("Tier is not active"));
        }
        if self.size < 2 {
            return Err(AppError::validation("Tier size must be at least 2"));
        }
        if self.group_price <= Decimal::ZERO {
            return Err(AppError::validation("Tier price must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn tier(course_id: CourseId) -> GroupTier {
        GroupTier {
            id: GroupTierId::new(),
            course_id,
            size: 5,
            group_price: dec!(10000),
            cashback_percent: dec!(0.1),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_purchasable_tier() {
        let course_id = CourseId::new();
        assert!(tier(course_id).ensure_purchasable(course_id).is_ok());
    }

    #[test]
    fn test_rejects_bad_tiers() {
        let course_id = CourseId::new();

        let err = tier(course_id).ensure_purchasable(CourseId::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut t = tier(course_id);
        t.is_active = false;
        assert!(t.ensure_purchasable(course_id).is_err());

        let mut t = tier(course_id);
        t.size = 1;
        assert!(t.ensure_purchasable(course_id).is_err());

        let mut t = tier(course_id);
        t.group_price = Decimal::ZERO;
        assert!(t.ensure_purchasable(course_id).is_err());
    }
}
