//! Hosted payment session opening.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use coursehub_core::config::PaymentConfig;
use coursehub_core::result::AppResult;
use coursehub_entity::ledger::Transaction;
use coursehub_payment::PaymentGateway;
use coursehub_payment::dto::PaymentSession;
use coursehub_payment::money::to_minor_units;

use crate::context::RequestContext;

/// Opens gateway sessions for recorded transactions.
#[derive(Debug, Clone)]
pub struct PaymentSessions {
    /// Remote gateway.
    gateway: Arc<dyn PaymentGateway>,
    /// Callback URL and currency.
    config: PaymentConfig,
}

impl PaymentSessions {
    /// Creates a new session opener.
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: PaymentConfig) -> Self {
        Self { gateway, config }
    }

    /// Currency recorded on new transactions.
    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Open a session charging `transaction.amount` to the caller.
    ///
    /// The transaction must already be persisted. On failure it stays
    /// PENDING and the error surfaces as `ExternalService`.
    pub async fn open(
        &self,
        ctx: &RequestContext,
        transaction: &Transaction,
    ) -> AppResult<PaymentSession> {
        let amount_minor = to_minor_units(transaction.amount)?;
        let metadata = json!({
            "transaction_id": transaction.id,
            "user_id": ctx.user_id,
            "group_purchase_id": transaction.group_purchase_id,
        });

        match self
            .gateway
            .initialize(
                &ctx.email,
                amount_minor,
                &transaction.reference,
                &self.config.callback_url,
                metadata,
            )
            .await
        {
            Ok(session) => {
                info!(
                    user_id = %ctx.user_id,
                    reference = %transaction.reference,
                    amount_minor,
                    "Payment session opened"
                );
                Ok(session)
            }
            Err(e) => {
                warn!(
                    user_id = %ctx.user_id,
                    reference = %transaction.reference,
                    error = %e,
                    "Payment session could not be opened; transaction left pending"
                );
                Err(e.into())
            }
        }
    }
}
