//! Response DTOs.

use serde::{Deserialize, Serialize};

use coursehub_service::{CheckoutQuote, CheckoutTotals, PromoRejection};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected`, `unreachable`, or `in-memory`.
    pub database: String,
}

/// Promo preview result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoValidationResponse {
    /// Whether the code would be applied.
    pub valid: bool,
    /// Applied code, normalized.
    pub code: Option<String>,
    /// Rejection reason when not valid.
    pub reason: Option<PromoRejection>,
    /// User-facing message.
    pub message: String,
    /// Prices with the promo applied (or without it when rejected).
    pub totals: CheckoutTotals,
}

impl From<CheckoutQuote> for PromoValidationResponse {
    fn from(quote: CheckoutQuote) -> Self {
        let message = match quote.promo_rejection {
            Some(reason) => reason.message().to_string(),
            None => "Promo code applied".to_string(),
        };
        Self {
            valid: quote.promo_rejection.is_none() && quote.promo_code.is_some(),
            code: quote.promo_code,
            reason: quote.promo_rejection,
            message,
            totals: quote.totals,
        }
    }
}
