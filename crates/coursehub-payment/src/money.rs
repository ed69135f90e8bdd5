//! Major/minor unit conversion at the gateway boundary.

use coursehub_core::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Minor units per major unit (kobo per naira).
pub const MINOR_PER_MAJOR: i64 = 100;

/// Convert a major-unit amount to minor units, rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::from(MINOR_PER_MAJOR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::validation(format!("Amount {amount} is out of range")))
}

/// Convert minor units reported by the gateway back to major units.
pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(dec!(37625)).unwrap(), 3_762_500);
        assert_eq!(to_minor_units(dec!(10.005)).unwrap(), 1001);
        assert_eq!(to_minor_units(dec!(0.01)).unwrap(), 1);
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(3_762_500), dec!(37625.00));
    }
}
