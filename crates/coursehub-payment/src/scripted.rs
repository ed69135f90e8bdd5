//! In-process gateway for tests and local demos.
//!
//! Sessions always open unless initialization is switched to fail; verify
//! answers whatever was scripted for the reference with [`ScriptedGateway::script`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::dto::{
    Bank, PaymentSession, Recipient, RecipientRequest, RemoteStatus, ResolvedAccount, Subaccount,
    SubaccountRequest, Transfer, TransferRequest, Verification,
};
use crate::error::GatewayError;
use crate::gateway::PaymentGateway;

/// One `initialize` call as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedSession {
    /// Payer email.
    pub email: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Our reference.
    pub reference: String,
}

#[derive(Debug, Default)]
struct Script {
    fail_initialize: bool,
    initialized: Vec<InitializedSession>,
    outcomes: HashMap<String, (RemoteStatus, i64)>,
    verify_calls: usize,
}

/// Gateway answering from a script instead of the network.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
}

impl ScriptedGateway {
    /// Create a gateway that accepts every initialization.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `initialize` fail with a gateway rejection.
    pub fn fail_initialize(&self, fail: bool) {
        self.lock().fail_initialize = fail;
    }

    /// Script the verify answer for `reference`.
    pub fn script(&self, reference: &str, status: RemoteStatus, amount_minor: i64) {
        self.lock()
            .outcomes
            .insert(reference.to_string(), (status, amount_minor));
    }

    /// Script a successful payment of the amount the session was opened for.
    pub fn pay_in_full(&self, reference: &str) -> bool {
        let mut script = self.lock();
        let Some(amount) = script
            .initialized
            .iter()
            .find(|s| s.reference == reference)
            .map(|s| s.amount_minor)
        else {
            return false;
        };
        script
            .outcomes
            .insert(reference.to_string(), (RemoteStatus::Success, amount));
        true
    }

    /// Every `initialize` call received, oldest first.
    pub fn sessions(&self) -> Vec<InitializedSession> {
        self.lock().initialized.clone()
    }

    /// How many times `verify` was called.
    pub fn verify_calls(&self) -> usize {
        self.lock().verify_calls
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize(
        &self,
        email: &str,
        amount_minor: i64,
        reference: &str,
        _callback_url: &str,
        _metadata: serde_json::Value,
    ) -> Result<PaymentSession, GatewayError> {
        let mut script = self.lock();
        if script.fail_initialize {
            return Err(GatewayError::Rejected {
                message: "Invalid key".to_string(),
            });
        }
        script.initialized.push(InitializedSession {
            email: email.to_string(),
            amount_minor,
            reference: reference.to_string(),
        });
        Ok(PaymentSession {
            authorization_url: format!("https://checkout.scripted.test/{reference}"),
            access_code: format!("access_{reference}"),
            reference: reference.to_string(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError> {
        let mut script = self.lock();
        script.verify_calls += 1;
        let (status, amount) = script
            .outcomes
            .get(reference)
            .cloned()
            .unwrap_or((RemoteStatus::Pending, 0));
        Ok(Verification {
            status,
            reference: reference.to_string(),
            amount,
            currency: "NGN".to_string(),
            paid_at: None,
            gateway_response: None,
            metadata: serde_json::Value::Null,
        })
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<Transfer, GatewayError> {
        Ok(Transfer {
            transfer_code: format!("TRF_{}", request.reference),
            reference: request.reference.clone(),
            status: "pending".to_string(),
            amount: request.amount,
        })
    }

    async fn create_recipient(
        &self,
        request: &RecipientRequest,
    ) -> Result<Recipient, GatewayError> {
        Ok(Recipient {
            recipient_code: format!("RCP_{}", request.account_number),
            name: request.name.clone(),
        })
    }

    async fn resolve_account(
        &self,
        account_number: &str,
        _bank_code: &str,
    ) -> Result<ResolvedAccount, GatewayError> {
        Ok(ResolvedAccount {
            account_number: account_number.to_string(),
            account_name: "SCRIPTED ACCOUNT".to_string(),
        })
    }

    async fn list_banks(&self) -> Result<Vec<Bank>, GatewayError> {
        Ok(Vec::new())
    }

    async fn create_subaccount(
        &self,
        request: &SubaccountRequest,
    ) -> Result<Subaccount, GatewayError> {
        Ok(Subaccount {
            subaccount_code: format!("ACCT_{}", request.account_number),
            business_name: request.business_name.clone(),
        })
    }
}
