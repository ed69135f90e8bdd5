//! Course entity model, limited to ownership and pricing fields.

use chrono::{DateTime, Utc};
use coursehub_core::types::{CategoryId, CourseId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course as seen by checkout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// The tutor who owns the course and receives the tutor share.
    pub tutor_id: UserId,
    /// Optional category, used by category-scoped promos.
    pub category_id: Option<CategoryId>,
    /// Course title.
    pub title: String,
    /// List price before any markdown.
    pub base_price: Option<Decimal>,
    /// Marked-down price, preferred when positive.
    pub current_price: Option<Decimal>,
    /// Legacy price column, last in the fallback chain.
    pub price: Option<Decimal>,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Price charged before promos: `current_price` if positive, else
    /// `base_price` if positive, else `price`, else zero.
    pub fn effective_price(&self) -> Decimal {
        [self.current_price, self.base_price]
            .into_iter()
            .flatten()
            .find(|p| *p > Decimal::ZERO)
            .or(self.price)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
    }
}
