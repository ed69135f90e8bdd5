//! Single-checkout flow and ledger row construction.

pub mod ledger;
pub mod service;

pub use ledger::ledger_rows;
pub use service::{CheckoutQuote, CheckoutReceipt, CheckoutRequest, CheckoutService};
