//! Promo code entities.

pub mod kind;
pub mod model;

pub use kind::{DiscountType, PromoScope};
pub use model::PromoCode;
