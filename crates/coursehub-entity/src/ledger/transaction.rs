//! Transaction entity model.

use chrono::{DateTime, Utc};
use coursehub_core::events::{CheckoutEvent, DomainEvent};
use coursehub_core::types::{GroupPurchaseId, PromoCodeId, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::TransactionStatus;

/// One checkout attempt. Amounts are in major units.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    /// Local identifier.
    pub id: TransactionId,
    /// The paying user.
    pub user_id: UserId,
    /// Gateway reference (`ps_…`), unique, the idempotency key.
    pub reference: String,
    /// Settlement status.
    pub status: TransactionStatus,
    /// Amount due, equal to the sum of line totals.
    pub amount: Decimal,
    /// Sum of effective prices.
    pub subtotal_amount: Decimal,
    /// Sum of promo discounts.
    pub discount_amount: Decimal,
    /// Sum of VAT.
    pub vat_amount: Decimal,
    /// Sum of tutor shares.
    pub tutor_share_amount: Decimal,
    /// Sum of platform shares.
    pub platform_share_amount: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Promo applied, if any.
    pub promo_code_id: Option<PromoCodeId>,
    /// Group purchase paid for by this transaction, if any.
    pub group_purchase_id: Option<GroupPurchaseId>,
    /// When the payment was confirmed.
    pub paid_at: Option<DateTime<Utc>>,
    /// When the attempt was recorded.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether this transaction paid for a group purchase.
    pub fn is_group_checkout(&self) -> bool {
        self.group_purchase_id.is_some()
    }

    /// Outbox event recorded with the PENDING row.
    pub fn created_event(&self) -> DomainEvent {
        DomainEvent::new(
            Some(self.user_id),
            CheckoutEvent::Created {
                transaction_id: self.id,
                reference: self.reference.clone(),
                user_id: self.user_id,
                amount: self.amount,
            }
            .into(),
        )
    }

    /// Outbox event recorded when the row leaves PENDING. `None` while pending.
    pub fn settlement_event(&self) -> Option<DomainEvent> {
        let event = match self.status {
            TransactionStatus::Pending => return None,
            TransactionStatus::Success => CheckoutEvent::Succeeded {
                transaction_id: self.id,
                reference: self.reference.clone(),
                user_id: self.user_id,
                amount: self.amount,
            },
            TransactionStatus::Failed => CheckoutEvent::Failed {
                transaction_id: self.id,
                reference: self.reference.clone(),
                user_id: self.user_id,
            },
        };
        Some(DomainEvent::new(Some(self.user_id), event.into()))
    }
}
