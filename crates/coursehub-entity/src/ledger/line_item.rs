//! Line item entity model.

use coursehub_core::types::{CourseId, LineItemId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-course pricing breakdown within a transaction.
///
/// `tutor_share_amount + platform_share_amount == discounted_price`; VAT is
/// excluded from the revenue split.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    /// Unique identifier.
    pub id: LineItemId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// The course bought.
    pub course_id: CourseId,
    /// Effective price (or the group price for group checkouts).
    pub unit_price: Decimal,
    /// Promo discount.
    pub discount_amount: Decimal,
    /// `unit_price - discount_amount`.
    pub discounted_price: Decimal,
    /// VAT on the discounted price.
    pub vat_amount: Decimal,
    /// `discounted_price + vat_amount`.
    pub total_amount: Decimal,
    /// Tutor's part of the discounted price.
    pub tutor_share_amount: Decimal,
    /// Platform's part of the discounted price.
    pub platform_share_amount: Decimal,
}
