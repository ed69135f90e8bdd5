//! Route handlers organized by domain.

pub mod checkout;
pub mod group;
pub mod health;
pub mod payment;
