//! Turns priced totals into PENDING ledger rows.

use chrono::Utc;

use coursehub_core::types::{GroupPurchaseId, LineItemId, PromoCodeId, TransactionId, UserId};
use coursehub_entity::ledger::{LineItem, Transaction, TransactionStatus};

use crate::pricing::CheckoutTotals;

/// Build a PENDING transaction and one line item per priced course.
///
/// The transaction amount equals the sum of line totals.
pub fn ledger_rows(
    user_id: UserId,
    reference: String,
    currency: &str,
    totals: &CheckoutTotals,
    promo_code_id: Option<PromoCodeId>,
    group_purchase_id: Option<GroupPurchaseId>,
) -> (Transaction, Vec<LineItem>) {
    let now = Utc::now();
    let transaction = Transaction {
        id: TransactionId::new(),
        user_id,
        reference,
        status: TransactionStatus::Pending,
        amount: totals.total_amount,
        subtotal_amount: totals.subtotal_amount,
        discount_amount: totals.discount_amount,
        vat_amount: totals.vat_amount,
        tutor_share_amount: totals.tutor_share_amount,
        platform_share_amount: totals.platform_share_amount,
        currency: currency.to_string(),
        promo_code_id,
        group_purchase_id,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };

    let items = totals
        .lines
        .iter()
        .map(|line| LineItem {
            id: LineItemId::new(),
            transaction_id: transaction.id,
            course_id: line.course_id,
            unit_price: line.unit_price,
            discount_amount: line.discount_amount,
            discounted_price: line.discounted_price,
            vat_amount: line.vat_amount,
            total_amount: line.total_amount,
            tutor_share_amount: line.tutor_share_amount,
            platform_share_amount: line.platform_share_amount,
        })
        .collect();

    (transaction, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::types::CourseId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::pricing::PricingEngine;

    #[test]
    fn test_rows_mirror_totals() {
        let totals = PricingEngine::new(dec!(0.2))
            .compute_lines(
                &[
                    (CourseId::new(), dec!(35000), Decimal::ZERO),
                    (CourseId::new(), dec!(12000), dec!(1200)),
                ],
                dec!(0.075),
            )
            .unwrap();
        let (transaction, items) =
            ledger_rows(UserId::new(), "ps_test".to_string(), "NGN", &totals, None, None);

        assert_eq!(transaction.status, TransactionStatus::Pending);
        assert_eq!(transaction.amount, totals.total_amount);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.transaction_id == transaction.id));
        let sum: Decimal = items.iter().map(|i| i.total_amount).sum();
        assert_eq!(sum, transaction.amount);
        assert_eq!(items[1].discount_amount, dec!(1200));
    }
}
