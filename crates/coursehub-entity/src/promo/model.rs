//! Promo code entity model.

use chrono::{DateTime, Utc};
use coursehub_core::types::{CategoryId, CourseId, PromoCodeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::{DiscountType, PromoScope};
use crate::course::Course;

/// A promo code. Checkout reads it and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
    /// Unique identifier.
    pub id: PromoCodeId,
    /// Upper-case code, unique.
    pub code: String,
    /// Percent or fixed.
    pub discount_type: DiscountType,
    /// Percent (0-100) or fixed amount in major units.
    pub discount_value: Decimal,
    /// Applicability scope.
    pub scope: PromoScope,
    /// Courses covered when `scope` is `Course`.
    pub course_ids: Vec<CourseId>,
    /// Categories covered when `scope` is `Category`.
    pub category_ids: Vec<CategoryId>,
    /// Total successful redemptions allowed.
    pub max_uses: Option<i32>,
    /// Successful redemptions allowed per user.
    pub max_uses_per_user: Option<i32>,
    /// Minimum order value (sum of effective prices).
    pub min_order_amount: Option<Decimal>,
    /// Master switch.
    pub is_active: bool,
    /// Start of the validity window.
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the validity window.
    pub ends_at: Option<DateTime<Utc>>,
    /// When the promo was created.
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    /// Canonical form used for storage and lookup.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Active and inside `[starts_at, ends_at]`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|start| now >= start)
            && self.ends_at.is_none_or(|end| now <= end)
    }

    /// Whether the promo covers this course.
    pub fn applies_to(&self, course: &Course) -> bool {
        match self.scope {
            PromoScope::All => true,
            PromoScope::Course => self.course_ids.contains(&course.id),
            PromoScope::Category => course
                .category_id
                .is_some_and(|category| self.category_ids.contains(&category)),
        }
    }
}
