//! Pricing engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coursehub_core::types::{round_money, truncate_money, CourseId};
use coursehub_core::{AppError, AppResult};
use coursehub_entity::course::Course;
use coursehub_entity::promo::{DiscountType, PromoCode};

const PERCENT_MAX: Decimal = Decimal::ONE_HUNDRED;

/// Pricing breakdown for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakdown {
    /// The course priced.
    pub course_id: CourseId,
    /// Effective price, or the group price for group checkouts.
    pub unit_price: Decimal,
    /// Promo discount, `0 <= discount <= unit_price`.
    pub discount_amount: Decimal,
    /// `unit_price - discount_amount`.
    pub discounted_price: Decimal,
    /// `round(discounted_price * vat_rate)`.
    pub vat_amount: Decimal,
    /// `discounted_price + vat_amount`.
    pub total_amount: Decimal,
    /// Tutor part of the discounted price.
    pub tutor_share_amount: Decimal,
    /// Platform part of the discounted price.
    pub platform_share_amount: Decimal,
}

/// Aggregated checkout totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    /// One entry per course, in request order.
    pub lines: Vec<LineBreakdown>,
    /// Sum of unit prices.
    pub subtotal_amount: Decimal,
    /// Sum of discounts.
    pub discount_amount: Decimal,
    /// Sum of VAT.
    pub vat_amount: Decimal,
    /// Sum of tutor shares.
    pub tutor_share_amount: Decimal,
    /// Sum of platform shares.
    pub platform_share_amount: Decimal,
    /// Sum of line totals; the amount charged.
    pub total_amount: Decimal,
}

/// Computes checkout breakdowns for a fixed platform commission rate.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine {
    commission_rate: Decimal,
}

impl PricingEngine {
    /// Creates an engine taking `commission_rate` (a fraction) of each
    /// discounted price for the platform.
    pub fn new(commission_rate: Decimal) -> Self {
        Self {
            commission_rate: commission_rate.clamp(Decimal::ZERO, Decimal::ONE),
        }
    }

    /// Price `courses`, applying `promo` to the courses it covers.
    ///
    /// Fails without side effects when the list is empty or the total is
    /// not positive.
    pub fn compute_checkout_totals(
        &self,
        courses: &[Course],
        promo: Option<&PromoCode>,
        vat_rate: Decimal,
    ) -> AppResult<CheckoutTotals> {
        let priced: Vec<(CourseId, Decimal, Decimal)> = courses
            .iter()
            .map(|course| {
                let unit_price = round_money(course.effective_price());
                let discount = promo
                    .filter(|p| p.applies_to(course))
                    .map_or(Decimal::ZERO, |p| promo_discount(p, unit_price));
                (course.id, unit_price, discount)
            })
            .collect();
        self.compute_lines(&priced, vat_rate)
    }

    /// Price a group checkout: one line at the tier's group price, no promo.
    pub fn compute_group_totals(
        &self,
        course_id: CourseId,
        group_price: Decimal,
        vat_rate: Decimal,
    ) -> AppResult<CheckoutTotals> {
        self.compute_lines(&[(course_id, round_money(group_price), Decimal::ZERO)], vat_rate)
    }

    /// Price explicit `(course, unit_price, discount)` lines and aggregate them.
    pub fn compute_lines(
        &self,
        lines: &[(CourseId, Decimal, Decimal)],
        vat_rate: Decimal,
    ) -> AppResult<CheckoutTotals> {
        if lines.is_empty() {
            return Err(AppError::validation("Select at least one course"));
        }

        let lines: Vec<LineBreakdown> = lines
            .iter()
            .map(|&(course_id, unit_price, discount)| self.line(course_id, unit_price, discount, vat_rate))
            .collect();

        let sum = |field: fn(&LineBreakdown) -> Decimal| -> Decimal { lines.iter().map(field).sum() };
        let totals = CheckoutTotals {
            subtotal_amount: sum(|l| l.unit_price),
            discount_amount: sum(|l| l.discount_amount),
            vat_amount: sum(|l| l.vat_amount),
            tutor_share_amount: sum(|l| l.tutor_share_amount),
            platform_share_amount: sum(|l| l.platform_share_amount),
            total_amount: sum(|l| l.total_amount),
            lines,
        };

        if totals.total_amount <= Decimal::ZERO {
            return Err(AppError::validation("Order total must be greater than zero"));
        }
        Ok(totals)
    }

    fn line(
        &self,
        course_id: CourseId,
        unit_price: Decimal,
        discount: Decimal,
        vat_rate: Decimal,
    ) -> LineBreakdown {
        let unit_price = unit_price.max(Decimal::ZERO);
        let discount_amount = discount.clamp(Decimal::ZERO, unit_price);
        let discounted_price = unit_price - discount_amount;
        let vat_amount = round_money(discounted_price * vat_rate);
        let tutor_share_amount =
            truncate_money(discounted_price * (Decimal::ONE - self.commission_rate));
        LineBreakdown {
            course_id,
            unit_price,
            discount_amount,
            discounted_price,
            vat_amount,
            total_amount: discounted_price + vat_amount,
            tutor_share_amount,
            platform_share_amount: discounted_price - tutor_share_amount,
        }
    }
}

/// Discount `promo` grants on `unit_price`, bounded to `[0, unit_price]`.
///
/// PERCENT values are clamped to 0-100; FIXED values are capped at the price.
pub fn promo_discount(promo: &PromoCode, unit_price: Decimal) -> Decimal {
    let raw = match promo.discount_type {
        DiscountType::Percent => {
            let percent = promo.discount_value.clamp(Decimal::ZERO, PERCENT_MAX);
            round_money(unit_price * percent / PERCENT_MAX)
        }
        DiscountType::Fixed => promo.discount_value,
    };
    raw.clamp(Decimal::ZERO, unit_price.max(Decimal::ZERO))
}
