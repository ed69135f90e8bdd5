//! Paystack-compatible HTTP gateway client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use coursehub_core::config::PaymentConfig;
use coursehub_core::{AppError, AppResult};

use crate::dto::{
    Bank, Envelope, InitializeRequest, PaymentSession, Recipient, RecipientRequest,
    ResolvedAccount, Subaccount, SubaccountRequest, Transfer, TransferRequest, Verification,
};
use crate::error::GatewayError;
use crate::gateway::PaymentGateway;

/// JSON-over-HTTPS client authenticated with the secret key as a bearer token.
#[derive(Clone)]
pub struct PaystackGateway {
    client: reqwest::Client,
    base_url: Url,
    secret_key: String,
    currency: String,
}

impl std::fmt::Debug for PaystackGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackGateway")
            .field("base_url", &self.base_url.as_str())
            .field("secret_key", &"****")
            .field("currency", &self.currency)
            .finish()
    }
}

impl PaystackGateway {
    /// Build a client from configuration; every call is bounded by `timeout_seconds`.
    pub fn new(config: &PaymentConfig) -> AppResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            AppError::configuration(format!("Invalid payment.base_url '{}': {e}", config.base_url))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| GatewayError::Decode(format!("bad URL {joined}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.secret_key)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "Gateway call failed");
            GatewayError::from(e)
        })?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .map(|envelope| envelope.message)
                .unwrap_or(body);
            warn!(operation, status = status.as_u16(), message = %message, "Gateway returned an error status");
            return Err(GatewayError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Decode(format!("{operation}: {e}")))?;
        if !envelope.status {
            warn!(operation, message = %envelope.message, "Gateway rejected the request");
            return Err(GatewayError::Rejected {
                message: envelope.message,
            });
        }
        debug!(operation, "Gateway call succeeded");
        envelope
            .data
            .ok_or_else(|| GatewayError::Decode(format!("{operation}: missing data")))
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize(
        &self,
        email: &str,
        amount_minor: i64,
        reference: &str,
        callback_url: &str,
        metadata: serde_json::Value,
    ) -> Result<PaymentSession, GatewayError> {
        let body = InitializeRequest {
            email: email.to_string(),
            amount: amount_minor,
            reference: reference.to_string(),
            callback_url: callback_url.to_string(),
            currency: self.currency.clone(),
            metadata,
        };
        let url = self.url("/transaction/initialize")?;
        self.send("initialize", self.request(Method::POST, url).json(&body))
            .await
    }

    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError> {
        let mut url = self.url("/transaction/verify/")?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Decode("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(reference);
        self.send("verify", self.request(Method::GET, url)).await
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<Transfer, GatewayError> {
        let url = self.url("/transfer")?;
        self.send("transfer", self.request(Method::POST, url).json(request))
            .await
    }

    async fn create_recipient(
        &self,
        request: &RecipientRequest,
    ) -> Result<Recipient, GatewayError> {
        let url = self.url("/transferrecipient")?;
        self.send(
            "create_recipient",
            self.request(Method::POST, url).json(request),
        )
        .await
    }

    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<ResolvedAccount, GatewayError> {
        let mut url = self.url("/bank/resolve")?;
        url.query_pairs_mut()
            .append_pair("account_number", account_number)
            .append_pair("bank_code", bank_code);
        self.send("resolve_account", self.request(Method::GET, url))
            .await
    }

    async fn list_banks(&self) -> Result<Vec<Bank>, GatewayError> {
        let url = self.url("/bank")?;
        self.send("list_banks", self.request(Method::GET, url)).await
    }

    async fn create_subaccount(
        &self,
        request: &SubaccountRequest,
    ) -> Result<Subaccount, GatewayError> {
        let url = self.url("/subaccount")?;
        self.send(
            "create_subaccount",
            self.request(Method::POST, url).json(request),
        )
        .await
    }
}
