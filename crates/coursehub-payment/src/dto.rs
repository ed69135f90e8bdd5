//! Gateway request and response shapes.

use serde::{Deserialize, Serialize};

/// Every gateway response is wrapped in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// `false` means the request was rejected even if the HTTP status was 2xx.
    pub status: bool,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Payload, absent on failure.
    pub data: Option<T>,
}

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    /// Payer email.
    pub email: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Our reference for this attempt.
    pub reference: String,
    /// Where the gateway sends the payer afterwards.
    pub callback_url: String,
    /// ISO currency code.
    pub currency: String,
    /// Free-form metadata echoed back by `verify`.
    pub metadata: serde_json::Value,
}

/// Remote payment session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSession {
    /// Hosted checkout URL the payer is redirected to.
    pub authorization_url: String,
    /// Gateway access code.
    pub access_code: String,
    /// Echo of our reference.
    pub reference: String,
}

/// Remote payment status as reported by `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    /// Paid.
    Success,
    /// Declined.
    Failed,
    /// Payer left the hosted page.
    Abandoned,
    /// Refunded or charged back.
    Reversed,
    /// Anything still in flight.
    #[serde(other)]
    Pending,
}

impl RemoteStatus {
    /// Whether the attempt will never succeed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Abandoned | Self::Reversed)
    }
}

/// Payload of `GET /transaction/verify/{reference}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Verification {
    /// Remote status.
    pub status: RemoteStatus,
    /// Echo of our reference.
    pub reference: String,
    /// Amount paid, minor units.
    pub amount: i64,
    /// ISO currency code.
    #[serde(default)]
    pub currency: String,
    /// When the payment cleared.
    #[serde(default)]
    pub paid_at: Option<String>,
    /// Processor message.
    #[serde(default)]
    pub gateway_response: Option<String>,
    /// Metadata sent at initialization.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Body of `POST /transferrecipient`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientRequest {
    /// Recipient type, `nuban` for local bank accounts.
    #[serde(rename = "type")]
    pub kind: String,
    /// Account holder name.
    pub name: String,
    /// Account number.
    pub account_number: String,
    /// Bank code from `list_banks`.
    pub bank_code: String,
    /// ISO currency code.
    pub currency: String,
}

/// A payout recipient.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    /// Code used by `transfer`.
    pub recipient_code: String,
    /// Account holder name.
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /transfer`.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    /// Funding source, always `balance`.
    pub source: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Recipient code.
    pub recipient: String,
    /// Narration shown to the recipient.
    pub reason: String,
    /// Our reference for the payout.
    pub reference: String,
}

/// A queued payout.
#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    /// Gateway transfer code.
    pub transfer_code: String,
    /// Echo of our reference.
    #[serde(default)]
    pub reference: String,
    /// Remote transfer status.
    pub status: String,
    /// Amount, minor units.
    pub amount: i64,
}

/// Result of `GET /bank/resolve`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedAccount {
    /// Account number.
    pub account_number: String,
    /// Name the bank holds for the account.
    pub account_name: String,
}

/// One entry of `GET /bank`.
#[derive(Debug, Clone, Deserialize)]
pub struct Bank {
    /// Display name.
    pub name: String,
    /// Code used in recipients and subaccounts.
    pub code: String,
}

/// Body of `POST /subaccount`.
#[derive(Debug, Clone, Serialize)]
pub struct SubaccountRequest {
    /// Tutor's business name.
    pub business_name: String,
    /// Settlement bank code.
    pub settlement_bank: String,
    /// Settlement account number.
    pub account_number: String,
    /// Platform commission as a percentage.
    pub percentage_charge: f64,
}

/// A split-payment subaccount.
#[derive(Debug, Clone, Deserialize)]
pub struct Subaccount {
    /// Code used to route splits.
    pub subaccount_code: String,
    /// Business name.
    #[serde(default)]
    pub business_name: String,
}
