//! Checkout pricing.
//!
//! Pure arithmetic over major-unit decimals. VAT and percentage discounts
//! round half away from zero; the tutor share truncates and the platform
//! share takes the remainder, so `tutor + platform == discounted` exactly.

pub mod engine;

pub use engine::{CheckoutTotals, LineBreakdown, PricingEngine};
