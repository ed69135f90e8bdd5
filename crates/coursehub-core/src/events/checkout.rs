//! Checkout and payment events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{TransactionId, UserId};

/// Events describing a checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CheckoutEvent {
    /// A PENDING transaction was recorded.
    Created {
        /// Ledger transaction ID.
        transaction_id: TransactionId,
        /// Gateway reference.
        reference: String,
        /// The paying user.
        user_id: UserId,
        /// Amount due in major units.
        amount: Decimal,
    },
    /// The gateway confirmed the payment.
    Succeeded {
        /// Ledger transaction ID.
        transaction_id: TransactionId,
        /// Gateway reference.
        reference: String,
        /// The paying user.
        user_id: UserId,
        /// Amount paid in major units.
        amount: Decimal,
    },
    /// The gateway reported the payment as failed.
    Failed {
        /// Ledger transaction ID.
        transaction_id: TransactionId,
        /// Gateway reference.
        reference: String,
        /// The paying user.
        user_id: UserId,
    },
}

impl CheckoutEvent {
    /// Short dotted event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "checkout.created",
            Self::Succeeded { .. } => "checkout.succeeded",
            Self::Failed { .. } => "checkout.failed",
        }
    }
}
