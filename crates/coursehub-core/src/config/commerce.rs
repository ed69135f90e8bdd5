//! Pricing and group-purchase configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Commerce rules applied by the pricing engine and the group coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// VAT rate as a fraction (0.075 = 7.5%).
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
    /// Platform commission taken from the discounted price, as a fraction.
    #[serde(default = "default_commission_rate")]
    pub platform_commission_rate: Decimal,
    /// How many invite codes are generated before group creation gives up.
    #[serde(default = "default_invite_code_attempts")]
    pub invite_code_attempts: u32,
    /// Base URL used to render shareable `/group/{inviteCode}` links.
    #[serde(default = "default_invite_base_url")]
    pub invite_base_url: String,
}

impl CommerceConfig {
    /// Reject rates outside `[0, 1]` and a zero retry budget.
    pub fn validate(&self) -> Result<(), AppError> {
        let unit = Decimal::ZERO..=Decimal::ONE;
        if !unit.contains(&self.vat_rate) {
            return Err(AppError::configuration(format!(
                "commerce.vat_rate must be within [0, 1], got {}",
                self.vat_rate
            )));
        }
        if !unit.contains(&self.platform_commission_rate) {
            return Err(AppError::configuration(format!(
                "commerce.platform_commission_rate must be within [0, 1], got {}",
                self.platform_commission_rate
            )));
        }
        if self.invite_code_attempts == 0 {
            return Err(AppError::configuration(
                "commerce.invite_code_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Render the shareable link for an invite code.
    pub fn invite_link(&self, invite_code: &str) -> String {
        format!(
            "{}/group/{}",
            self.invite_base_url.trim_end_matches('/'),
            invite_code
        )
    }
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            vat_rate: default_vat_rate(),
            platform_commission_rate: default_commission_rate(),
            invite_code_attempts: default_invite_code_attempts(),
            invite_base_url: default_invite_base_url(),
        }
    }
}

fn default_vat_rate() -> Decimal {
    Decimal::new(75, 3)
}

fn default_commission_rate() -> Decimal {
    Decimal::new(20, 2)
}

fn default_invite_code_attempts() -> u32 {
    5
}

fn default_invite_base_url() -> String {
    "http://localhost:3000".to_string()
}
