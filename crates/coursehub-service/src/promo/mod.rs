//! Promo code validation.
//!
//! Runs server-side on every checkout and backs the preview endpoint. A
//! client-supplied discount is never trusted; the pricing engine recomputes
//! it from the validated promo.

pub mod validator;

pub use validator::{PromoDecision, PromoRejection, PromoValidator};
