//! Gateway port.

use async_trait::async_trait;

use crate::dto::{
    Bank, PaymentSession, Recipient, RecipientRequest, ResolvedAccount, Subaccount,
    SubaccountRequest, Transfer, TransferRequest, Verification,
};
use crate::error::GatewayError;

/// Operations the commerce core issues against the payment gateway.
///
/// Implementations bound every call by a timeout and report non-2xx
/// responses and `status: false` bodies as [`GatewayError`].
#[async_trait]
pub trait PaymentGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Open a hosted payment session for `amount_minor`.
    async fn initialize(
        &self,
        email: &str,
        amount_minor: i64,
        reference: &str,
        callback_url: &str,
        metadata: serde_json::Value,
    ) -> Result<PaymentSession, GatewayError>;

    /// Fetch the remote state of a payment.
    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError>;

    /// Queue a payout.
    async fn transfer(&self, request: &TransferRequest) -> Result<Transfer, GatewayError>;

    /// Register a payout recipient.
    async fn create_recipient(
        &self,
        request: &RecipientRequest,
    ) -> Result<Recipient, GatewayError>;

    /// Look up the holder of a bank account.
    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<ResolvedAccount, GatewayError>;

    /// List supported banks.
    async fn list_banks(&self) -> Result<Vec<Bank>, GatewayError>;

    /// Create a split-payment subaccount for a tutor.
    async fn create_subaccount(
        &self,
        request: &SubaccountRequest,
    ) -> Result<Subaccount, GatewayError>;
}
