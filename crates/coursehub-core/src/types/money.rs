//! Rounding rules for major-unit money amounts.
//!
//! Every amount persisted by the ledger carries two decimal places. Products
//! (VAT, percentage discounts, cashback) are rounded half away from zero;
//! revenue splits truncate so the remainder can be assigned explicitly.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Round to two decimal places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate to two decimal places toward zero.
pub fn truncate_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero)
}
