//! Promo discount type and scope enumerations.

use serde::{Deserialize, Serialize};

/// How a promo's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "discount_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountType {
    /// Percentage of the effective price, 0 to 100.
    Percent,
    /// Fixed amount in major units, capped at the effective price.
    Fixed,
}

/// Which courses a promo applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "promo_scope", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PromoScope {
    /// Every course.
    All,
    /// Only the listed `course_ids`.
    Course,
    /// Courses whose category is in `category_ids`.
    Category,
}
