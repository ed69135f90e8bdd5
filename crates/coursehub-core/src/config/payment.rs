//! Payment gateway configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection settings for the remote payment gateway.
#[derive(Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Gateway API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Secret key sent as a bearer token.
    pub secret_key: String,
    /// URL the gateway redirects the payer back to.
    pub callback_url: String,
    /// ISO currency code passed with every initialization.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Upper bound for every outbound gateway call, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &"****")
            .field("callback_url", &self.callback_url)
            .field("currency", &self.currency)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            callback_url: "http://localhost:3000/payment/callback".to_string(),
            currency: default_currency(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

fn default_timeout() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_secret_key() {
        let config = PaymentConfig {
            base_url: default_base_url(),
            secret_key: "sk_live_abcdef".to_string(),
            callback_url: "https://example.com/callback".to_string(),
            currency: default_currency(),
            timeout_seconds: default_timeout(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk_live_abcdef"));
        assert!(rendered.contains("****"));
    }
}
