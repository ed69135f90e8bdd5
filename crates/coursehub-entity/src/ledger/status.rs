//! Transaction status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a checkout transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Recorded locally, payment not yet confirmed.
    Pending,
    /// Gateway confirmed the payment.
    Success,
    /// Gateway reported failure or abandonment.
    Failed,
}

impl TransactionStatus {
    /// Check if the transaction has been settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Return the status as an upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
